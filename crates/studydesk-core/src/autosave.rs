//! Debounced autosave for a note being edited.
//!
//! Each edit restarts a fixed delay; only the last edit inside the window is
//! written. The pending timer lives in a spawned task owned by [`Autosave`]
//! and is aborted when the handle is dropped, so nothing is written after
//! the editor goes away.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::StudyError;
use crate::model::{CourseId, NoteDraft, NoteId};
use crate::traits::StudyApi;

/// Default debounce delay.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_secs(5);

/// What the most recent saves did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaveStatus {
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub saves: u32,
}

/// Scoped debounce handle for one note. Must be used inside a tokio runtime.
pub struct Autosave {
    api: Arc<dyn StudyApi>,
    note: NoteId,
    course: CourseId,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    status: Arc<Mutex<SaveStatus>>,
}

impl Autosave {
    pub fn new(api: Arc<dyn StudyApi>, note: NoteId, course: CourseId, delay: Duration) -> Self {
        Self {
            api,
            note,
            course,
            delay,
            pending: None,
            status: Arc::new(Mutex::new(SaveStatus::default())),
        }
    }

    /// Record an edit, restarting the timer. Returns whether a save was
    /// scheduled; edits with an empty title or empty content are not saved.
    pub fn edit(&mut self, title: &str, content: &str) -> bool {
        self.cancel();
        if title.is_empty() || content.is_empty() {
            return false;
        }

        let api = Arc::clone(&self.api);
        let status = Arc::clone(&self.status);
        let note = self.note;
        let delay = self.delay;
        let draft = NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            course: self.course,
        };

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let outcome = api.update_note(note, &draft).await;
            record(&status, note, outcome);
        }));
        true
    }

    /// Cancel any pending timer and save right away.
    pub async fn save_now(&mut self, title: &str, content: &str) -> Result<(), StudyError> {
        self.cancel();
        let draft = NoteDraft {
            title: title.to_string(),
            content: content.to_string(),
            course: self.course,
        };
        match self.api.update_note(self.note, &draft).await {
            Ok(()) => {
                record(&self.status, self.note, Ok(()));
                Ok(())
            }
            Err(e) => {
                record(&self.status, self.note, Err(anyhow::anyhow!("{e:#}")));
                Err(StudyError::fetch("Failed to save note", e))
            }
        }
    }

    /// Drop the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// True while a timer is waiting or a save is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn status(&self) -> SaveStatus {
        self.status.lock().unwrap().clone()
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn record(status: &Mutex<SaveStatus>, note: NoteId, outcome: anyhow::Result<()>) {
    let mut status = status.lock().unwrap();
    match outcome {
        Ok(()) => {
            debug!(note = %note, "note saved");
            status.last_saved = Some(Utc::now());
            status.last_error = None;
            status.saves += 1;
        }
        Err(e) => {
            warn!(note = %note, error = %format!("{e:#}"), "failed to save note");
            status.last_error = Some("Failed to save note".to_string());
        }
    }
}
