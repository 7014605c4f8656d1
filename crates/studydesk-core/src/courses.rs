//! Course directory store.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::StudyError;
use crate::model::{Course, CourseForm, CourseId};
use crate::traits::StudyApi;

/// Fallback label for a course id that is not in the directory.
pub const UNKNOWN_COURSE: &str = "Unknown Course";

/// Holds the list of courses.
///
/// Create and update refetch the whole list; delete filters the local list
/// once the server has confirmed.
pub struct CourseDirectory {
    api: Arc<dyn StudyApi>,
    courses: Vec<Course>,
    loaded: bool,
    loading: bool,
    error: Option<String>,
}

impl CourseDirectory {
    pub fn new(api: Arc<dyn StudyApi>) -> Self {
        Self {
            api,
            courses: Vec::new(),
            loaded: false,
            loading: false,
            error: None,
        }
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
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

    pub fn find(&self, id: CourseId) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// Course name for display, or [`UNKNOWN_COURSE`].
    pub fn name_of(&self, id: CourseId) -> &str {
        self.find(id).map_or(UNKNOWN_COURSE, |c| c.name.as_str())
    }

    /// Replace the list with the server's current one.
    pub async fn fetch_all(&mut self) -> Result<(), StudyError> {
        self.loading = true;
        let outcome = self.api.list_courses().await;
        self.loading = false;
        match outcome {
            Ok(courses) => {
                debug!(count = courses.len(), "fetched courses");
                self.courses = courses;
                self.loaded = true;
                self.error = None;
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to fetch courses", e)),
        }
    }

    /// Fetch one course and merge it into the local list. A course the
    /// backend reports missing is dropped locally and returned as
    /// [`StudyError::NotFound`].
    pub async fn load(&mut self, id: CourseId) -> Result<Course, StudyError> {
        match self.api.get_course(id).await {
            Ok(course) => {
                match self.courses.iter_mut().find(|c| c.id == id) {
                    Some(slot) => *slot = course.clone(),
                    None => self.courses.push(course.clone()),
                }
                self.error = None;
                Ok(course)
            }
            Err(e) => {
                let err = self.fail("Failed to fetch course", e);
                if !err.is_not_found() {
                    return Err(err);
                }
                self.courses.retain(|c| c.id != id);
                Err(self.reject(StudyError::NotFound {
                    kind: "course",
                    id: id.0,
                }))
            }
        }
    }

    /// Create a course, refetch, and return its server-assigned id.
    pub async fn add(&mut self, form: &CourseForm) -> Result<CourseId, StudyError> {
        if let Err(e) = form.validate_for_create() {
            return Err(self.reject(e));
        }
        let created = match self.api.create_course(form).await {
            Ok(course) => course,
            Err(e) => return Err(self.fail("Failed to create course", e)),
        };
        self.fetch_all().await?;
        Ok(created.id)
    }

    pub async fn update(&mut self, id: CourseId, form: &CourseForm) -> Result<(), StudyError> {
        if let Err(e) = form.validate_for_update() {
            return Err(self.reject(e));
        }
        if let Err(e) = self.api.update_course(id, form).await {
            return Err(self.fail("Failed to update course", e));
        }
        self.fetch_all().await
    }

    pub async fn remove(&mut self, id: CourseId) -> Result<(), StudyError> {
        if let Err(e) = self.api.delete_course(id).await {
            return Err(self.fail("Failed to delete course", e));
        }
        self.courses.retain(|c| c.id != id);
        Ok(())
    }

    fn reject(&mut self, err: StudyError) -> StudyError {
        warn!(error = %err, "course rejected");
        self.error = Some(err.user_message());
        err
    }

    fn fail(&mut self, message: &str, cause: anyhow::Error) -> StudyError {
        warn!(error = %format!("{cause:#}"), "{message}");
        self.error = Some(message.to_string());
        StudyError::fetch(message, cause)
    }
}
