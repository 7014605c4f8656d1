//! Note store, indexed by course.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::StudyError;
use crate::model::{CourseId, Note, NoteDraft, NoteId};
use crate::traits::StudyApi;

/// Maximum preview length in characters, before the ellipsis.
pub const PREVIEW_CHARS: usize = 120;

/// Outcome of opening a note for editing.
#[derive(Debug, PartialEq)]
pub enum NoteLookup<'a> {
    Found(&'a Note),
    /// The store has not been fetched yet.
    Loading,
    /// The note is absent after loading; show the parent course instead.
    Redirect(CourseId),
}

/// Holds all notes plus a per-course grouping.
pub struct NoteStore {
    api: Arc<dyn StudyApi>,
    notes: Vec<Note>,
    by_course: HashMap<CourseId, Vec<Note>>,
    loaded: bool,
    loading: bool,
    error: Option<String>,
}

impl NoteStore {
    pub fn new(api: Arc<dyn StudyApi>) -> Self {
        Self {
            api,
            notes: Vec::new(),
            by_course: HashMap::new(),
            loaded: false,
            loading: false,
            error: None,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notes_for_course(&self, course: CourseId) -> &[Note] {
        self.by_course
            .get(&course)
            .map(|notes| notes.as_slice())
            .unwrap_or(&[])
    }

    pub fn find(&self, id: NoteId) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Resolve a note opened from a course view.
    pub fn open(&self, course: CourseId, id: NoteId) -> NoteLookup<'_> {
        if !self.loaded {
            return NoteLookup::Loading;
        }
        match self.find(id) {
            Some(note) => NoteLookup::Found(note),
            None => {
                warn!(note = %id, course = %course, "note not found, redirecting to course");
                NoteLookup::Redirect(course)
            }
        }
    }

    /// Up to `limit` notes, most recently touched first. Notes without any
    /// timestamp sort last.
    pub fn recent(&self, limit: usize) -> Vec<&Note> {
        let mut sorted: Vec<&Note> = self.notes.iter().collect();
        sorted.sort_by(|a, b| b.last_touched().cmp(&a.last_touched()));
        sorted.truncate(limit);
        sorted
    }

    pub async fn fetch_all(&mut self) -> Result<(), StudyError> {
        self.loading = true;
        let outcome = self.api.list_notes().await;
        self.loading = false;
        match outcome {
            Ok(notes) => {
                debug!(count = notes.len(), "fetched notes");
                self.set_notes(notes);
                self.loaded = true;
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to fetch notes", e)),
        }
    }

    /// Fetch one note and merge it into the list and its course bucket. A
    /// note the backend reports missing is dropped locally and returned as
    /// [`StudyError::NotFound`].
    pub async fn load(&mut self, id: NoteId) -> Result<Note, StudyError> {
        match self.api.get_note(id).await {
            Ok(note) => {
                let mut notes: Vec<Note> =
                    self.notes.iter().filter(|n| n.id != id).cloned().collect();
                notes.push(note.clone());
                self.set_notes(notes);
                self.error = None;
                Ok(note)
            }
            Err(e) => {
                let err = self.fail("Failed to fetch note", e);
                if !err.is_not_found() {
                    return Err(err);
                }
                let remaining = self.notes.iter().filter(|n| n.id != id).cloned().collect();
                self.set_notes(remaining);
                let missing = StudyError::NotFound { kind: "note", id: id.0 };
                warn!(note = %id, "note no longer exists");
                self.error = Some(missing.user_message());
                Err(missing)
            }
        }
    }

    /// Create a note, refetch, and return its server-assigned id.
    pub async fn add(&mut self, draft: &NoteDraft) -> Result<NoteId, StudyError> {
        if draft.title.trim().is_empty() {
            let err = StudyError::Validation("Note title is required".into());
            warn!(course = %draft.course, error = %err, "note rejected");
            self.error = Some(err.user_message());
            return Err(err);
        }
        let created = match self.api.create_note(draft).await {
            Ok(note) => note,
            Err(e) => return Err(self.fail("Failed to create note", e)),
        };
        self.fetch_all().await?;
        Ok(created.id)
    }

    pub async fn update(&mut self, id: NoteId, draft: &NoteDraft) -> Result<(), StudyError> {
        if let Err(e) = self.api.update_note(id, draft).await {
            return Err(self.fail("Failed to update note", e));
        }
        self.fetch_all().await
    }

    pub async fn remove(&mut self, id: NoteId) -> Result<(), StudyError> {
        if let Err(e) = self.api.delete_note(id).await {
            return Err(self.fail("Failed to delete note", e));
        }
        let remaining = self.notes.iter().filter(|n| n.id != id).cloned().collect();
        self.set_notes(remaining);
        Ok(())
    }

    fn set_notes(&mut self, notes: Vec<Note>) {
        let mut by_course: HashMap<CourseId, Vec<Note>> = HashMap::new();
        for note in &notes {
            by_course.entry(note.course).or_default().push(note.clone());
        }
        self.notes = notes;
        self.by_course = by_course;
    }

    fn fail(&mut self, message: &str, cause: anyhow::Error) -> StudyError {
        warn!(error = %format!("{cause:#}"), "{message}");
        self.error = Some(message.to_string());
        StudyError::fetch(message, cause)
    }
}

/// Plain-text preview of rich-text markup.
///
/// Tags are dropped, the common entities decoded, whitespace collapsed, and
/// the result cut at [`PREVIEW_CHARS`] characters with a trailing `...`.
pub fn preview(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }

    let decoded = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let collapsed = decoded.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() > PREVIEW_CHARS {
        let cut: String = collapsed.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        collapsed
    }
}
