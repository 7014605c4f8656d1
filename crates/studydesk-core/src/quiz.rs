//! Quiz session state container.
//!
//! Drives generate → answer → submit → results. Grading authority is the
//! backend; the session only stores verdicts and aggregates them.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::StudyError;
use crate::model::{CourseId, Question, QuizOptions, QuizResult};
use crate::statistics::{aggregate_topics, ScoreSummary, TopicScore};
use crate::traits::StudyApi;

/// How far through the quiz the user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    /// Floor of `answered / total * 100`.
    pub percentage: u32,
}

/// A question together with the user's answer and, after submission, the verdict.
#[derive(Debug, Clone, Copy)]
pub struct Outcome<'a> {
    pub index: usize,
    pub question: &'a Question,
    pub answer: &'a str,
    pub result: Option<&'a QuizResult>,
}

/// Transient state from quiz generation through scoring.
///
/// Invariant: `answers.len() == questions.len()`.
pub struct QuizSession {
    api: Arc<dyn StudyApi>,
    questions: Vec<Question>,
    answers: Vec<String>,
    results: Option<Vec<QuizResult>>,
    loading: bool,
    error: Option<String>,
}

impl QuizSession {
    pub fn new(api: Arc<dyn StudyApi>) -> Self {
        Self {
            api,
            questions: Vec::new(),
            answers: Vec::new(),
            results: None,
            loading: false,
            error: None,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn results(&self) -> Option<&[QuizResult]> {
        self.results.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True when there is at least one question and no answer is empty.
    pub fn is_complete(&self) -> bool {
        !self.answers.is_empty() && self.answers.iter().all(|a| !a.is_empty())
    }

    pub fn progress(&self) -> Progress {
        let answered = self.answers.iter().filter(|a| !a.is_empty()).count();
        let total = self.questions.len();
        let percentage = if total == 0 {
            0
        } else {
            (answered * 100 / total) as u32
        };
        Progress {
            answered,
            total,
            percentage,
        }
    }

    /// Request a new question set.
    ///
    /// Prior results are dropped as soon as the request starts. On success
    /// the questions are replaced and every answer is reset to empty; on
    /// failure questions and answers are left as they were.
    pub async fn generate(
        &mut self,
        course: CourseId,
        options: &QuizOptions,
    ) -> Result<(), StudyError> {
        self.loading = true;
        self.error = None;
        self.results = None;
        let outcome = self.api.generate_quiz(course, options).await;
        self.loading = false;

        match outcome {
            Ok(questions) => {
                debug!(course = %course, count = questions.len(), "generated quiz");
                self.answers = vec![String::new(); questions.len()];
                self.questions = questions;
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to generate quiz", e)),
        }
    }

    /// Overwrite the answer at `index`. Changing an answer after submission
    /// drops the verdicts, which no longer describe the answers.
    pub fn set_answer(&mut self, index: usize, value: impl Into<String>) -> Result<(), StudyError> {
        let len = self.answers.len();
        let Some(slot) = self.answers.get_mut(index) else {
            let message = format!("answer index {index} out of range for {len} questions");
            debug!(index, len, "rejected answer");
            return Err(StudyError::Validation(message));
        };
        let value = value.into();
        if *slot != value {
            *slot = value;
            self.results = None;
        }
        Ok(())
    }

    /// Send the answers and store the per-question verdicts.
    pub async fn submit(&mut self, course: CourseId) -> Result<&[QuizResult], StudyError> {
        if self.questions.is_empty() {
            return Err(self.reject("There is no quiz to submit"));
        }
        if !self.is_complete() {
            return Err(self.reject("Answer all questions before submitting"));
        }

        self.loading = true;
        self.error = None;
        self.results = None;
        let outcome = self.api.submit_quiz(course, &self.answers).await;
        self.loading = false;

        let results = match outcome {
            Ok(results) => results,
            Err(e) => return Err(self.fail("Failed to submit quiz", e)),
        };
        if results.len() != self.questions.len() {
            let message = "Failed to submit quiz";
            warn!(
                expected = self.questions.len(),
                received = results.len(),
                "{message}: result count mismatch"
            );
            self.error = Some(message.to_string());
            return Err(StudyError::fetch(
                message,
                anyhow::anyhow!(
                    "expected {} results, received {}",
                    self.questions.len(),
                    results.len()
                ),
            ));
        }

        debug!(course = %course, "quiz submitted");
        Ok(self.results.insert(results).as_slice())
    }

    /// Reset to the empty state before starting a new quiz.
    pub fn clear(&mut self) {
        self.questions.clear();
        self.answers.clear();
        self.results = None;
        self.error = None;
    }

    /// Questions paired with answers and verdicts, in order.
    pub fn outcomes(&self) -> Vec<Outcome<'_>> {
        self.questions
            .iter()
            .zip(&self.answers)
            .enumerate()
            .map(|(index, (question, answer))| Outcome {
                index,
                question,
                answer,
                result: self.results.as_ref().and_then(|r| r.get(index)),
            })
            .collect()
    }

    /// Overall score, once results are in.
    pub fn score(&self, pass_threshold: u32) -> Option<ScoreSummary> {
        self.results
            .as_deref()
            .map(|r| ScoreSummary::compute(r, pass_threshold))
    }

    /// Per-topic accuracy, once results are in.
    pub fn topic_scores(&self) -> Option<BTreeMap<String, TopicScore>> {
        self.results
            .as_deref()
            .map(|r| aggregate_topics(&self.questions, r))
    }

    fn reject(&mut self, message: &str) -> StudyError {
        warn!("{message}");
        self.error = Some(message.to_string());
        StudyError::Validation(message.to_string())
    }

    fn fail(&mut self, message: &str, cause: anyhow::Error) -> StudyError {
        warn!(error = %format!("{cause:#}"), "{message}");
        self.error = Some(message.to_string());
        StudyError::fetch(message, cause)
    }
}
