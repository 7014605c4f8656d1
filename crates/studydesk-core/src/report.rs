//! Quiz report types with JSON persistence and text/markdown rendering.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{CourseId, QuestionType};
use crate::quiz::QuizSession;
use crate::statistics::{ScoreSummary, TopicScore};

/// A finished quiz, ready to display or archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub course_id: CourseId,
    pub course_name: String,
    pub score: ScoreSummary,
    /// Accuracy per topic, ordered by topic name.
    pub topics: BTreeMap<String, TopicScore>,
    /// One entry per question, in quiz order.
    pub questions: Vec<QuestionReport>,
}

/// How one question went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionReport {
    pub title: String,
    pub question_type: QuestionType,
    pub topics: Vec<String>,
    pub answer: String,
    pub correct: bool,
    pub correct_option: String,
}

impl QuizReport {
    /// Build a report from a submitted session. Returns `None` before results arrive.
    pub fn from_session(
        session: &QuizSession,
        course_id: CourseId,
        course_name: &str,
        pass_threshold: u32,
    ) -> Option<Self> {
        let score = session.score(pass_threshold)?;
        let topics = session.topic_scores()?;
        let questions = session
            .outcomes()
            .into_iter()
            .map(|o| QuestionReport {
                title: o.question.title.clone(),
                question_type: o.question.question_type,
                topics: o.question.topics.clone(),
                answer: o.answer.to_string(),
                correct: o.result.is_some_and(|r| r.correct),
                correct_option: o
                    .result
                    .map(|r| r.correct_option.clone())
                    .unwrap_or_default(),
            })
            .collect();

        Some(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            course_id,
            course_name: course_name.to_string(),
            score,
            topics,
            questions,
        })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    fn verdict(&self) -> &'static str {
        if self.score.passed {
            "Passed"
        } else {
            "Needs Improvement"
        }
    }

    /// Format the report for a terminal.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Quiz results for {}\n", self.course_name));
        out.push_str(&format!(
            "Score: {}% {} ({} correct out of {} questions) - {}\n",
            self.score.percentage,
            self.score.grade,
            self.score.correct,
            self.score.total,
            self.verdict()
        ));

        if !self.topics.is_empty() {
            out.push_str("\nPerformance by topic:\n");
            for (topic, stats) in &self.topics {
                out.push_str(&format!(
                    "  {topic}: {}% ({} / {} correct)\n",
                    stats.percentage(),
                    stats.correct,
                    stats.total
                ));
            }
        }

        out.push_str("\nQuestions:\n");
        for (i, q) in self.questions.iter().enumerate() {
            let mark = if q.correct { "correct" } else { "incorrect" };
            out.push_str(&format!("  {}. {} [{mark}]\n", i + 1, q.title));
            out.push_str(&format!("     your answer: {}\n", single_line(&q.answer)));
            if !q.correct && !q.correct_option.is_empty() {
                out.push_str(&format!(
                    "     correct answer: {}\n",
                    single_line(&q.correct_option)
                ));
            }
        }
        out
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## Quiz results: {}\n\n", self.course_name));
        md.push_str(&format!(
            "**Score:** {}% ({}) - {} correct out of {} - {}\n\n",
            self.score.percentage,
            self.score.grade,
            self.score.correct,
            self.score.total,
            self.verdict()
        ));

        if !self.topics.is_empty() {
            md.push_str("### Performance by topic\n\n");
            md.push_str("| Topic | Correct | Total | Score |\n");
            md.push_str("|-------|---------|-------|-------|\n");
            for (topic, stats) in &self.topics {
                md.push_str(&format!(
                    "| {} | {} | {} | {}% |\n",
                    topic,
                    stats.correct,
                    stats.total,
                    stats.percentage()
                ));
            }
            md.push('\n');
        }

        md.push_str("### Questions\n\n");
        md.push_str("| # | Question | Type | Result | Correct answer |\n");
        md.push_str("|---|----------|------|--------|----------------|\n");
        for (i, q) in self.questions.iter().enumerate() {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                i + 1,
                q.title,
                q.question_type,
                if q.correct { "correct" } else { "incorrect" },
                single_line(&q.correct_option)
            ));
        }

        md
    }
}

fn single_line(s: &str) -> String {
    s.lines().map(str::trim).collect::<Vec<_>>().join(" ")
}
