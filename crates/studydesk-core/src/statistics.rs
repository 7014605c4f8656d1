//! Score aggregation over server verdicts.
//!
//! Nothing here decides correctness. Every number is derived from the
//! `correct` flags the backend returned, paired positionally with the
//! questions they belong to.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Question, QuizResult};

/// Default minimum percentage for a passing quiz.
pub const DEFAULT_PASS_THRESHOLD: u32 = 70;

/// Letter grade derived from a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

/// `correct / total` rounded to the nearest whole percent.
pub fn percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(correct) / f64::from(total) * 100.0).round() as u32
}

/// Overall quiz score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub correct: u32,
    pub total: u32,
    pub percentage: u32,
    pub grade: Grade,
    pub passed: bool,
}

impl ScoreSummary {
    pub fn compute(results: &[QuizResult], pass_threshold: u32) -> Self {
        let total = results.len() as u32;
        let correct = results.iter().filter(|r| r.correct).count() as u32;
        let percentage = percentage(correct, total);
        Self {
            correct,
            total,
            percentage,
            grade: Grade::from_percentage(percentage),
            passed: percentage >= pass_threshold,
        }
    }
}

/// Accuracy within one topic bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopicScore {
    pub correct: u32,
    pub total: u32,
}

impl TopicScore {
    pub fn percentage(&self) -> u32 {
        percentage(self.correct, self.total)
    }
}

/// Group verdicts by topic.
///
/// A question with N topics contributes to N buckets. Questions without a
/// matching result (a short result list) count towards `total` only.
pub fn aggregate_topics(
    questions: &[Question],
    results: &[QuizResult],
) -> BTreeMap<String, TopicScore> {
    let mut buckets: BTreeMap<String, TopicScore> = BTreeMap::new();
    for (index, question) in questions.iter().enumerate() {
        let correct = results.get(index).is_some_and(|r| r.correct);
        for topic in &question.topics {
            let bucket = buckets.entry(topic.clone()).or_default();
            bucket.total += 1;
            if correct {
                bucket.correct += 1;
            }
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;

    fn question(topics: &[&str]) -> Question {
        Question {
            title: "q".into(),
            content: String::new(),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            question_type: QuestionType::Mcq,
            options: vec![],
            starter_code: None,
        }
    }

    fn verdict(correct: bool) -> QuizResult {
        QuizResult {
            correct,
            correct_option: "x".into(),
        }
    }

    #[test]
    fn topics_count_each_tag_independently() {
        let questions = vec![question(&["A", "B"]), question(&["A"])];
        let results = vec![verdict(true), verdict(false)];
        let topics = aggregate_topics(&questions, &results);

        assert_eq!(topics.len(), 2);
        assert_eq!(topics["A"], TopicScore { correct: 1, total: 2 });
        assert_eq!(topics["B"], TopicScore { correct: 1, total: 1 });
        assert_eq!(topics["A"].percentage(), 50);
        assert_eq!(topics["B"].percentage(), 100);
    }

    #[test]
    fn untagged_questions_produce_no_buckets() {
        let topics = aggregate_topics(&[question(&[])], &[verdict(true)]);
        assert!(topics.is_empty());
    }

    #[test]
    fn score_rounds_and_grades() {
        let results = vec![verdict(true), verdict(true), verdict(false)];
        let score = ScoreSummary::compute(&results, DEFAULT_PASS_THRESHOLD);
        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 3);
        assert_eq!(score.percentage, 67);
        assert_eq!(score.grade, Grade::D);
        assert!(!score.passed);
    }

    #[test]
    fn grade_boundaries() {
        assert_eq!(Grade::from_percentage(100), Grade::A);
        assert_eq!(Grade::from_percentage(90), Grade::A);
        assert_eq!(Grade::from_percentage(89), Grade::B);
        assert_eq!(Grade::from_percentage(70), Grade::C);
        assert_eq!(Grade::from_percentage(60), Grade::D);
        assert_eq!(Grade::from_percentage(59), Grade::F);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        let results: Vec<_> = (0..10).map(|i| verdict(i < 7)).collect();
        assert!(ScoreSummary::compute(&results, 70).passed);
        assert!(!ScoreSummary::compute(&results, 71).passed);
    }

    #[test]
    fn empty_results_score_zero() {
        let score = ScoreSummary::compute(&[], DEFAULT_PASS_THRESHOLD);
        assert_eq!(score.percentage, 0);
        assert_eq!(score.grade, Grade::F);
    }
}
