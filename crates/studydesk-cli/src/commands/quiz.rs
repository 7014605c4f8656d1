//! The `studydesk quiz` commands.

use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use studydesk_core::model::{CourseId, Question, QuestionType, QuizOptions};
use studydesk_core::report::QuizReport;
use studydesk_core::{CourseDirectory, QuizSession};

use crate::QuizAction;

use super::connect;

/// Line that ends a multi-line code answer.
const END_OF_CODE: &str = ".";

pub async fn execute(action: QuizAction, config_path: Option<PathBuf>) -> Result<()> {
    match action {
        QuizAction::Run {
            course,
            topics,
            question_type,
            format,
            output,
        } => {
            check_format(&format)?;
            let options = QuizOptions::parse(topics.as_deref(), Some(&question_type))?;
            let session = connect(config_path)?;
            let course = CourseId(course);

            let mut directory = CourseDirectory::new(session.api.clone());
            if let Err(e) = directory.fetch_all().await {
                eprintln!("Warning: {e}");
            }
            let course_name = directory.name_of(course).to_string();

            let mut quiz = QuizSession::new(session.api.clone());
            eprintln!("Generating quiz for {course_name}...");
            quiz.generate(course, &options).await?;
            anyhow::ensure!(
                !quiz.questions().is_empty(),
                "the backend returned no questions"
            );

            let mut input = BufReader::new(tokio::io::stdin()).lines();
            let total = quiz.questions().len();
            for index in 0..total {
                let question = quiz.questions()[index].clone();
                print_question(&question, index, total);
                let answer = read_answer(&mut input, &question).await?;
                quiz.set_answer(index, answer)?;
                let progress = quiz.progress();
                eprintln!(
                    "Progress: {}% ({} of {} answered)",
                    progress.percentage, progress.answered, progress.total
                );
            }

            quiz.submit(course).await?;
            let report = QuizReport::from_session(
                &quiz,
                course,
                &course_name,
                session.config.pass_threshold,
            )
            .ok_or_else(|| anyhow::anyhow!("no results were returned"))?;

            print_report(&report, &format)?;

            if let Some(path) = output {
                report.save_json(&path)?;
                eprintln!("Report saved to: {}", path.display());
            }
        }
        QuizAction::Show { report, format } => {
            check_format(&format)?;
            let report = QuizReport::load_json(&report)?;
            print_report(&report, &format)?;
        }
    }

    Ok(())
}

fn check_format(format: &str) -> Result<()> {
    anyhow::ensure!(
        matches!(format, "text" | "markdown" | "md" | "json"),
        "unknown format '{format}', expected text, markdown or json"
    );
    Ok(())
}

fn print_report(report: &QuizReport, format: &str) -> Result<()> {
    match format {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        _ => println!("{}", report.to_text()),
    }
    Ok(())
}

fn print_question(question: &Question, index: usize, total: usize) {
    println!("\nQuestion {} of {}: {}", index + 1, total, question.title);
    if !question.content.is_empty() {
        println!("{}", question.content);
    }
    if !question.topics.is_empty() {
        println!("Topics: {}", question.topics.join(", "));
    }
    match question.question_type {
        QuestionType::Mcq => {
            for (i, option) in question.options.iter().enumerate() {
                println!("  {}) {}", i + 1, option);
            }
            println!("Answer with an option number or the option text:");
        }
        QuestionType::Code => {
            if let Some(starter) = &question.starter_code {
                println!("Starter code:\n{starter}");
            }
            println!("Write your code, then a line with a single '{END_OF_CODE}':");
        }
    }
}

/// Read one non-empty answer. A number picks a multiple-choice option.
async fn read_answer<R>(input: &mut Lines<BufReader<R>>, question: &Question) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    loop {
        let answer = match question.question_type {
            QuestionType::Mcq => {
                let line = next_line(input).await?;
                resolve_option(line.trim(), &question.options)
            }
            QuestionType::Code => {
                let mut code = Vec::new();
                loop {
                    let line = next_line(input).await?;
                    if line.trim() == END_OF_CODE {
                        break;
                    }
                    code.push(line);
                }
                code.join("\n")
            }
        };
        if !answer.trim().is_empty() {
            return Ok(answer);
        }
        eprintln!("An answer is required.");
    }
}

async fn next_line<R>(input: &mut Lines<BufReader<R>>) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    input
        .next_line()
        .await?
        .ok_or_else(|| anyhow::anyhow!("input ended before all questions were answered"))
}

fn resolve_option(input: &str, options: &[String]) -> String {
    input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .cloned()
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(question_type: QuestionType) -> Question {
        Question {
            title: "q".into(),
            content: String::new(),
            topics: vec![],
            question_type,
            options: vec!["alpha".into(), "beta".into()],
            starter_code: None,
        }
    }

    #[test]
    fn numbers_pick_options() {
        let options = vec!["alpha".to_string(), "beta".to_string()];
        assert_eq!(resolve_option("2", &options), "beta");
        assert_eq!(resolve_option("alpha", &options), "alpha");
        assert_eq!(resolve_option("0", &options), "0");
        assert_eq!(resolve_option("7", &options), "7");
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        let mut input = BufReader::new(&b"\n  \n1\n"[..]).lines();
        let answer = read_answer(&mut input, &question(QuestionType::Mcq))
            .await
            .unwrap();
        assert_eq!(answer, "alpha");
    }

    #[tokio::test]
    async fn code_answers_end_at_dot() {
        let mut input = BufReader::new(&b"fn main() {\n}\n.\nleftover\n"[..]).lines();
        let answer = read_answer(&mut input, &question(QuestionType::Code))
            .await
            .unwrap();
        assert_eq!(answer, "fn main() {\n}");
        assert_eq!(input.next_line().await.unwrap().as_deref(), Some("leftover"));
    }

    #[tokio::test]
    async fn eof_is_an_error() {
        let mut input = BufReader::new(&b""[..]).lines();
        assert!(read_answer(&mut input, &question(QuestionType::Mcq))
            .await
            .is_err());
    }
}
