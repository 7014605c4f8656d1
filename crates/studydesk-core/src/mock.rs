//! In-memory backend for testing and offline use.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::ApiError;
use crate::model::{
    Course, CourseForm, CourseId, Note, NoteDraft, NoteId, Question, QuizOptions, QuizResult,
};
use crate::traits::StudyApi;

/// A mock backend that keeps courses and notes in memory.
///
/// Ids are assigned sequentially. Generation returns the configured question
/// set; submission returns the configured verdicts, or grades each answer
/// against the question's first option when none are configured.
pub struct MockApi {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    courses: Vec<Course>,
    notes: Vec<Note>,
    next_id: u64,
    questions: Vec<Question>,
    results: Option<Vec<QuizResult>>,
    failing: HashSet<&'static str>,
    calls: HashMap<&'static str, u32>,
    last_options: Option<QuizOptions>,
    last_submission: Option<Vec<String>>,
    note_updates: Vec<(NoteId, NoteDraft)>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_id: 1,
                ..Default::default()
            }),
        }
    }

    /// Seed a course with the given name.
    pub fn with_course(self, name: &str, instructor: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = CourseId(state.take_id());
            state.courses.push(Course {
                id,
                name: name.to_string(),
                instructor: instructor.to_string(),
                syllabus: None,
            });
        }
        self
    }

    /// Seed a note.
    pub fn with_note(self, course: CourseId, title: &str, content: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = NoteId(state.take_id());
            let now = Utc::now();
            state.notes.push(Note {
                id,
                title: title.to_string(),
                content: content.to_string(),
                course,
                created_at: Some(now),
                updated_at: Some(now),
            });
        }
        self
    }

    /// Questions returned by every generation request.
    pub fn with_questions(self, questions: Vec<Question>) -> Self {
        self.state.lock().unwrap().questions = questions;
        self
    }

    /// Verdicts returned by every submission, regardless of the answers.
    pub fn with_results(self, results: Vec<QuizResult>) -> Self {
        self.state.lock().unwrap().results = Some(results);
        self
    }

    /// Make every call to `operation` (e.g. "list_notes") fail with a network error.
    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    /// Let `operation` succeed again.
    pub fn recover(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.remove(operation);
    }

    /// Number of calls made to `operation`.
    pub fn call_count(&self, operation: &str) -> u32 {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub fn last_options(&self) -> Option<QuizOptions> {
        self.state.lock().unwrap().last_options.clone()
    }

    pub fn last_submission(&self) -> Option<Vec<String>> {
        self.state.lock().unwrap().last_submission.clone()
    }

    /// Every note update received, in order.
    pub fn note_updates(&self) -> Vec<(NoteId, NoteDraft)> {
        self.state.lock().unwrap().note_updates.clone()
    }

    fn enter(&self, operation: &'static str) -> anyhow::Result<std::sync::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock().unwrap();
        *state.calls.entry(operation).or_insert(0) += 1;
        if state.failing.contains(operation) {
            return Err(ApiError::Network(format!("{operation} unavailable")).into());
        }
        Ok(state)
    }
}

impl MockState {
    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn course_index(&self, id: CourseId) -> anyhow::Result<usize> {
        self.courses
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/api/course/{id}/")).into())
    }

    fn note_index(&self, id: NoteId) -> anyhow::Result<usize> {
        self.notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("/api/note/{id}/")).into())
    }
}

#[async_trait]
impl StudyApi for MockApi {
    async fn list_courses(&self) -> anyhow::Result<Vec<Course>> {
        Ok(self.enter("list_courses")?.courses.clone())
    }

    async fn get_course(&self, id: CourseId) -> anyhow::Result<Course> {
        let state = self.enter("get_course")?;
        let index = state.course_index(id)?;
        Ok(state.courses[index].clone())
    }

    async fn create_course(&self, form: &CourseForm) -> anyhow::Result<Course> {
        let mut state = self.enter("create_course")?;
        let id = CourseId(state.take_id());
        let course = Course {
            id,
            name: form.name.clone(),
            instructor: form.instructor.clone(),
            syllabus: form
                .syllabus
                .as_ref()
                .map(|s| format!("/media/syllabi/{}", s.file_name)),
        };
        state.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, id: CourseId, form: &CourseForm) -> anyhow::Result<()> {
        let mut state = self.enter("update_course")?;
        let index = state.course_index(id)?;
        let course = &mut state.courses[index];
        course.name = form.name.clone();
        course.instructor = form.instructor.clone();
        if let Some(syllabus) = &form.syllabus {
            course.syllabus = Some(format!("/media/syllabi/{}", syllabus.file_name));
        }
        Ok(())
    }

    async fn delete_course(&self, id: CourseId) -> anyhow::Result<()> {
        let mut state = self.enter("delete_course")?;
        let index = state.course_index(id)?;
        state.courses.remove(index);
        state.notes.retain(|n| n.course != id);
        Ok(())
    }

    async fn list_notes(&self) -> anyhow::Result<Vec<Note>> {
        Ok(self.enter("list_notes")?.notes.clone())
    }

    async fn get_note(&self, id: NoteId) -> anyhow::Result<Note> {
        let state = self.enter("get_note")?;
        let index = state.note_index(id)?;
        Ok(state.notes[index].clone())
    }

    async fn create_note(&self, draft: &NoteDraft) -> anyhow::Result<Note> {
        let mut state = self.enter("create_note")?;
        let id = NoteId(state.take_id());
        let now = Utc::now();
        let note = Note {
            id,
            title: draft.title.clone(),
            content: draft.content.clone(),
            course: draft.course,
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: NoteId, draft: &NoteDraft) -> anyhow::Result<()> {
        let mut state = self.enter("update_note")?;
        let index = state.note_index(id)?;
        let note = &mut state.notes[index];
        note.title = draft.title.clone();
        note.content = draft.content.clone();
        note.course = draft.course;
        note.updated_at = Some(Utc::now());
        state.note_updates.push((id, draft.clone()));
        Ok(())
    }

    async fn delete_note(&self, id: NoteId) -> anyhow::Result<()> {
        let mut state = self.enter("delete_note")?;
        let index = state.note_index(id)?;
        state.notes.remove(index);
        Ok(())
    }

    async fn generate_quiz(
        &self,
        course: CourseId,
        options: &QuizOptions,
    ) -> anyhow::Result<Vec<Question>> {
        let mut state = self.enter("generate_quiz")?;
        state.course_index(course)?;
        state.last_options = Some(options.clone());
        Ok(state.questions.clone())
    }

    async fn submit_quiz(
        &self,
        course: CourseId,
        answers: &[String],
    ) -> anyhow::Result<Vec<QuizResult>> {
        let mut state = self.enter("submit_quiz")?;
        state.course_index(course)?;
        state.last_submission = Some(answers.to_vec());
        if let Some(results) = &state.results {
            return Ok(results.clone());
        }
        Ok(answers
            .iter()
            .zip(&state.questions)
            .map(|(answer, question)| {
                let expected = question.options.first().cloned().unwrap_or_default();
                QuizResult {
                    correct: *answer == expected,
                    correct_option: expected,
                }
            })
            .collect())
    }
}
