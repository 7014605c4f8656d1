//! studydesk CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "studydesk", version, about = "Courses, notes and generated quizzes from the terminal")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage courses
    Courses {
        #[command(subcommand)]
        action: CourseAction,
    },

    /// Manage notes
    Notes {
        #[command(subcommand)]
        action: NoteAction,
    },

    /// Generate and take quizzes
    Quiz {
        #[command(subcommand)]
        action: QuizAction,
    },

    /// Show courses and recently edited notes
    Dashboard,

    /// Create a starter config file
    Init,
}

#[derive(Subcommand)]
pub enum CourseAction {
    /// List all courses
    List,

    /// Create a course
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        instructor: String,

        /// Syllabus file to upload
        #[arg(long)]
        syllabus: PathBuf,
    },

    /// Update a course; omitted fields keep their current values
    Update {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        instructor: Option<String>,

        /// Replacement syllabus file
        #[arg(long)]
        syllabus: Option<PathBuf>,
    },

    /// Delete a course
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum NoteAction {
    /// List notes, optionally for one course
    List {
        #[arg(long)]
        course: Option<u64>,
    },

    /// Create an empty note
    Create {
        #[arg(long)]
        course: u64,

        #[arg(long)]
        title: String,
    },

    /// Print a note
    Show {
        id: u64,

        /// Course the note was opened from; shows the course instead if the note is gone
        #[arg(long)]
        course: Option<u64>,
    },

    /// Save new title or content
    Edit {
        id: u64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,

        /// Read content from a file
        #[arg(long)]
        content_file: Option<PathBuf>,
    },

    /// Append lines from stdin to a note, autosaving while typing
    Write { id: u64 },

    /// Delete a note
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum QuizAction {
    /// Generate a quiz, answer it on stdin, and print the results
    Run {
        #[arg(long)]
        course: u64,

        /// Focus topics (comma separated)
        #[arg(long)]
        topics: Option<String>,

        /// Question type: all, mcq, code
        #[arg(long = "type", default_value = "all")]
        question_type: String,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print a saved quiz report
    Show {
        /// Report written by `quiz run --output`
        report: PathBuf,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("studydesk=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Courses { action } => commands::courses::execute(action, config).await,
        Commands::Notes { action } => commands::notes::execute(action, config).await,
        Commands::Quiz { action } => commands::quiz::execute(action, config).await,
        Commands::Dashboard => commands::dashboard::execute(config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
