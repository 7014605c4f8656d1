//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A `studydesk` invocation isolated from the caller's config and environment.
fn studydesk(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("studydesk").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("STUDYDESK_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, server: &MockServer) -> PathBuf {
    let config = dir.join("studydesk.toml");
    std::fs::write(
        &config,
        format!("[api]\nbase_url = \"{}\"\ntimeout_secs = 5\n", server.uri()),
    )
    .unwrap();
    config
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().unwrap();
    studydesk(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("courses"))
        .stdout(predicate::str::contains("notes"))
        .stdout(predicate::str::contains("quiz"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    studydesk(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created studydesk.toml"));

    let written = std::fs::read_to_string(dir.path().join("studydesk.toml")).unwrap();
    assert!(written.contains("base_url = \"http://localhost:8000\""));
    assert!(written.contains("pass_threshold = 70"));

    studydesk(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    studydesk(dir.path())
        .args(["--config", "nowhere.toml", "courses", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn create_course_needs_readable_syllabus() {
    let dir = TempDir::new().unwrap();
    studydesk(dir.path())
        .args([
            "courses",
            "create",
            "--name",
            "Algorithms",
            "--instructor",
            "Knuth",
            "--syllabus",
            "missing.pdf",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn blank_note_title_is_rejected() {
    let dir = TempDir::new().unwrap();
    studydesk(dir.path())
        .args(["notes", "create", "--course", "1", "--title", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Note title is required"));
}

#[test]
fn unknown_quiz_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    studydesk(dir.path())
        .args(["quiz", "run", "--course", "1", "--format", "html"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[tokio::test(flavor = "multi_thread")]
async fn courses_list_shows_note_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Algorithms", "instructor": "Knuth", "syllabus": "/media/algo.pdf"},
            {"id": 2, "name": "Databases", "instructor": "Codd"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/note/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "title": "Heaps", "content": "<p>sift</p>", "course": 1},
            {"id": 4, "title": "Graphs", "content": "", "course": 1}
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["courses", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Algorithms"))
        .stdout(predicate::str::contains("Databases"))
        .stdout(predicate::str::contains("/media/algo.pdf"));
}

#[tokio::test(flavor = "multi_thread")]
async fn courses_list_reports_backend_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/note/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["courses", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to fetch courses"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_note_redirects_to_course() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/note/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "title": "Heaps", "content": "<p>sift</p>", "course": 2}
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["notes", "show", "9", "--course", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("showing course 2 instead"))
        .stdout(predicate::str::contains("Heaps"));
}

#[tokio::test(flavor = "multi_thread")]
async fn quiz_run_scores_stdin_answers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "name": "Algorithms", "instructor": "Knuth"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/course/3/generate_quiz/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "title": "BFS order",
                "context": "Graph traversal",
                "topics": ["Graphs"],
                "question_type": "mcq",
                "options": ["A B C", "A C B"]
            },
            {
                "title": "Write DFS",
                "topics": ["Graphs", "Recursion"],
                "question_type": "code",
                "options": [],
                "starter_code": "fn dfs() {}"
            }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/course/3/submit_quiz/"))
        .and(body_json(json!(
            {"submission": [{"answer": "A C B"}, {"answer": "fn dfs() {}"}]}
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"correct": true, "correct_option": "A C B"},
                {"correct": false, "correct_option": ""}
            ]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    let report = dir.path().join("report.json");
    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["quiz", "run", "--course", "3", "--output"])
        .arg(&report)
        .write_stdin("2\nfn dfs() {}\n.\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiz results for Algorithms"))
        .stdout(predicate::str::contains("Score: 50%"))
        .stdout(predicate::str::contains("Needs Improvement"))
        .stdout(predicate::str::contains("Graphs: 50% (1 / 2 correct)"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(saved["course_name"], "Algorithms");
    assert_eq!(saved["score"]["correct"], 1);

    studydesk(dir.path())
        .args(["quiz", "show", "--format", "markdown"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("## Quiz results: Algorithms"))
        .stdout(predicate::str::contains("| Graphs | 1 | 2 | 50% |"));
}

#[test]
fn quiz_show_missing_report_fails() {
    let dir = TempDir::new().unwrap();
    studydesk(dir.path())
        .args(["quiz", "show", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read report"));
}

#[tokio::test(flavor = "multi_thread")]
async fn note_deleted_on_backend_redirects_to_course() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/note/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "title": "Heaps", "content": "<p>sift</p>", "course": 2},
            {"id": 9, "title": "Stale", "content": "", "course": 2}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/note/9/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["notes", "show", "9", "--course", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("showing course 2 instead"))
        .stdout(predicate::str::contains("Heaps"))
        .stdout(predicate::str::contains("Stale").not());

    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["notes", "edit", "9", "--title", "Fresh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("note 9 not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn updating_missing_course_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/5/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["courses", "update", "5", "--name", "Renamed"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("course 5 not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn quiz_run_fails_when_input_ends_early() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/course/3/generate_quiz/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Q1", "question_type": "mcq", "options": ["a", "b"]},
            {"title": "Q2", "question_type": "mcq", "options": ["a", "b"]}
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .args(["quiz", "run", "--course", "3"])
        .write_stdin("1\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("input ended"));
}

#[tokio::test(flavor = "multi_thread")]
async fn dashboard_lists_recent_notes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/course/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Algorithms", "instructor": "Knuth"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/note/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 3,
                "title": "Heaps",
                "content": "<p>sift &amp; swim</p>",
                "course": 1,
                "updated_at": "2026-03-01T10:00:00Z"
            },
            {"id": 4, "title": "Orphan", "content": "", "course": 7}
        ])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    studydesk(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("dashboard")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 courses, 2 notes"))
        .stdout(predicate::str::contains("[3] Heaps (Algorithms, 2026-03-01 10:00)"))
        .stdout(predicate::str::contains("sift & swim"))
        .stdout(predicate::str::contains("[4] Orphan (Unknown Course, -)"));
}
