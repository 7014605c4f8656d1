//! studydesk-core: data model, state stores and quiz scoring.
//!
//! The stores (`CourseDirectory`, `NoteStore`, `QuizSession`) are plain
//! owned values wired to a backend through the [`traits::StudyApi`] trait.

pub mod autosave;
pub mod courses;
pub mod error;
pub mod mock;
pub mod model;
pub mod notes;
pub mod quiz;
pub mod report;
pub mod statistics;
pub mod traits;

#[cfg(test)]
mod testing;

pub use courses::CourseDirectory;
pub use error::{ApiError, StudyError};
pub use notes::NoteStore;
pub use quiz::QuizSession;
pub use traits::StudyApi;
