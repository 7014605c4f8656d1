//! Core data model types for studydesk.
//!
//! These mirror the backend's JSON resources. Identifiers are `u64` newtypes
//! everywhere, so a course id can never be compared against a note id or a
//! stringly-typed route parameter.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StudyError;

/// Server-assigned course identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(pub u64);

/// Server-assigned note identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub u64);

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CourseId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CourseId)
    }
}

impl FromStr for NoteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(NoteId)
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

/// A unit of study containing notes and quizzes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub instructor: String,
    /// URL of the uploaded syllabus, if the server exposes one.
    #[serde(default)]
    pub syllabus: Option<String>,
}

/// A file sent along with a multipart form.
#[derive(Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Attachment {
    /// Read a file from disk, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read attachment: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self {
            mime_type: guess_mime_type(&file_name).to_string(),
            file_name,
            bytes,
        })
    }
}

fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

/// Form data used to create or update a course.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseForm {
    pub name: String,
    pub instructor: String,
    /// Required on create; on update the server keeps the previous file when omitted.
    pub syllabus: Option<Attachment>,
}

impl CourseForm {
    /// Check the fields required to create a course.
    pub fn validate_for_create(&self) -> Result<(), StudyError> {
        if self.name.trim().is_empty()
            || self.instructor.trim().is_empty()
            || self.syllabus.is_none()
        {
            return Err(StudyError::Validation("All fields are required".into()));
        }
        Ok(())
    }

    /// Check the fields required to update a course.
    pub fn validate_for_update(&self) -> Result<(), StudyError> {
        if self.name.trim().is_empty() || self.instructor.trim().is_empty() {
            return Err(StudyError::Validation(
                "Course name and instructor are required".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// A rich-text document belonging to one course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Rich-text markup, passed through untouched.
    #[serde(default)]
    pub content: String,
    pub course: CourseId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// The most recent known modification time.
    pub fn last_touched(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// Payload for creating or updating a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub course: CourseId,
}

impl NoteDraft {
    /// A fresh note with a trimmed title and no content.
    pub fn new(course: CourseId, title: &str) -> Result<Self, StudyError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StudyError::Validation("Note title is required".into()));
        }
        Ok(Self {
            title: title.to_string(),
            content: String::new(),
            course,
        })
    }
}

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

/// Supported question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    Mcq,
    Code,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::Mcq => write!(f, "mcq"),
            QuestionType::Code => write!(f, "code"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mcq" => Ok(QuestionType::Mcq),
            "code" => Ok(QuestionType::Code),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// A generated quiz question. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub title: String,
    #[serde(default, alias = "context")]
    pub content: String,
    #[serde(default)]
    pub topics: Vec<String>,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub starter_code: Option<String>,
}

/// Server verdict for one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub correct: bool,
    pub correct_option: String,
}

/// Optional filters sent with a generation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_type: Option<QuestionType>,
}

impl QuizOptions {
    /// Build options from user input: a comma-separated topic list and a
    /// type filter where `all` (or nothing) means no filter.
    pub fn parse(topics: Option<&str>, question_type: Option<&str>) -> Result<Self, StudyError> {
        let topics = topics
            .map(|t| {
                t.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect::<Vec<_>>()
            })
            .filter(|t| !t.is_empty());

        let question_type = match question_type.map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(other) => Some(other.parse().map_err(StudyError::Validation)?),
        };

        Ok(Self {
            topics,
            question_type,
        })
    }
}

/// One answer as sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub answer: String,
}

/// Body of a quiz submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub submission: Vec<SubmittedAnswer>,
}

impl QuizSubmission {
    /// Package answers positionally.
    pub fn from_answers(answers: &[String]) -> Self {
        Self {
            submission: answers
                .iter()
                .map(|a| SubmittedAnswer { answer: a.clone() })
                .collect(),
        }
    }
}

/// Body returned by the submission endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub results: Vec<QuizResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_accepts_context_alias_and_missing_lists() {
        let json = r#"{
            "title": "What is ownership?",
            "context": "Rust basics",
            "question_type": "mcq"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.content, "Rust basics");
        assert!(q.topics.is_empty());
        assert!(q.options.is_empty());
        assert!(q.starter_code.is_none());
    }

    #[test]
    fn ids_serialize_as_numbers() {
        let note = Note {
            id: NoteId(7),
            title: "t".into(),
            content: String::new(),
            course: CourseId(3),
            created_at: None,
            updated_at: None,
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["course"], 3);
        assert_eq!("42".parse::<CourseId>().unwrap(), CourseId(42));
        assert!("abc".parse::<NoteId>().is_err());
    }

    #[test]
    fn quiz_options_parsing() {
        let opts = QuizOptions::parse(Some(" Graphs, ,Trees "), Some("all")).unwrap();
        assert_eq!(
            opts.topics,
            Some(vec!["Graphs".to_string(), "Trees".to_string()])
        );
        assert_eq!(opts.question_type, None);

        let opts = QuizOptions::parse(Some(" , "), Some("code")).unwrap();
        assert_eq!(opts.topics, None);
        assert_eq!(opts.question_type, Some(QuestionType::Code));

        assert!(QuizOptions::parse(None, Some("essay")).is_err());
    }

    #[test]
    fn quiz_options_omit_absent_fields() {
        let json = serde_json::to_value(QuizOptions::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn submission_is_positional() {
        let answers = vec!["a".to_string(), "fn main() {}".to_string()];
        let json = serde_json::to_value(QuizSubmission::from_answers(&answers)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"submission": [{"answer": "a"}, {"answer": "fn main() {}"}]})
        );
    }

    #[test]
    fn course_form_validation() {
        let mut form = CourseForm {
            name: "Algorithms".into(),
            instructor: "  ".into(),
            syllabus: None,
        };
        assert!(form.validate_for_create().is_err());
        form.instructor = "Dr. Knuth".into();
        assert!(form.validate_for_update().is_ok());
        assert!(form.validate_for_create().is_err());
        form.syllabus = Some(Attachment {
            file_name: "syllabus.pdf".into(),
            mime_type: guess_mime_type("syllabus.pdf").into(),
            bytes: vec![1, 2, 3],
        });
        assert!(form.validate_for_create().is_ok());
    }

    #[test]
    fn note_draft_requires_title() {
        assert!(NoteDraft::new(CourseId(1), "   ").is_err());
        let draft = NoteDraft::new(CourseId(1), "  Lecture 1 ").unwrap();
        assert_eq!(draft.title, "Lecture 1");
        assert!(draft.content.is_empty());
    }

    #[test]
    fn attachment_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Syllabus.PDF");
        std::fs::write(&path, b"%PDF").unwrap();
        let attachment = Attachment::from_path(&path).unwrap();
        assert_eq!(attachment.file_name, "Syllabus.PDF");
        assert_eq!(attachment.mime_type, "application/pdf");
        assert_eq!(attachment.bytes, b"%PDF");
    }
}
