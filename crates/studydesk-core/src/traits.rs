//! The backend seam.
//!
//! Every store receives an `Arc<dyn StudyApi>` through its constructor.
//! `studydesk-client` provides the HTTP implementation; [`crate::mock`]
//! provides an in-memory one.

use async_trait::async_trait;

use crate::model::{
    Course, CourseForm, CourseId, Note, NoteDraft, NoteId, Question, QuizOptions, QuizResult,
};

/// Async client for the study backend's REST contract.
///
/// Errors are `anyhow` so implementations can attach context; the HTTP
/// implementation wraps an [`crate::error::ApiError`] that callers may
/// downcast to classify the failure.
#[async_trait]
pub trait StudyApi: Send + Sync {
    async fn list_courses(&self) -> anyhow::Result<Vec<Course>>;

    async fn get_course(&self, id: CourseId) -> anyhow::Result<Course>;

    /// Create a course and return the server's representation of it.
    async fn create_course(&self, form: &CourseForm) -> anyhow::Result<Course>;

    async fn update_course(&self, id: CourseId, form: &CourseForm) -> anyhow::Result<()>;

    async fn delete_course(&self, id: CourseId) -> anyhow::Result<()>;

    async fn list_notes(&self) -> anyhow::Result<Vec<Note>>;

    async fn get_note(&self, id: NoteId) -> anyhow::Result<Note>;

    async fn create_note(&self, draft: &NoteDraft) -> anyhow::Result<Note>;

    async fn update_note(&self, id: NoteId, draft: &NoteDraft) -> anyhow::Result<()>;

    async fn delete_note(&self, id: NoteId) -> anyhow::Result<()>;

    /// Ask the backend to generate a question set for a course.
    async fn generate_quiz(
        &self,
        course: CourseId,
        options: &QuizOptions,
    ) -> anyhow::Result<Vec<Question>>;

    /// Submit answers positionally and receive the per-question verdicts.
    async fn submit_quiz(
        &self,
        course: CourseId,
        answers: &[String],
    ) -> anyhow::Result<Vec<QuizResult>>;
}
