//! The `studydesk dashboard` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studydesk_core::notes::preview;
use studydesk_core::{CourseDirectory, NoteStore};

use super::connect;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let session = connect(config_path)?;
    let mut directory = CourseDirectory::new(session.api.clone());
    let mut store = NoteStore::new(session.api.clone());

    let (courses, notes) = futures::join!(directory.fetch_all(), store.fetch_all());
    // Either half is still worth showing when the other fails.
    if let Err(e) = &courses {
        eprintln!("Warning: {e}");
    }
    if let Err(e) = &notes {
        eprintln!("Warning: {e}");
    }
    if courses.is_err() && notes.is_err() {
        anyhow::bail!("could not reach the backend at {}", session.config.api.base_url);
    }

    println!(
        "{} courses, {} notes\n",
        directory.courses().len(),
        store.notes().len()
    );

    if !directory.courses().is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Course", "Instructor", "Notes"]);
        for course in directory.courses() {
            table.add_row(vec![
                Cell::new(&course.name),
                Cell::new(&course.instructor),
                Cell::new(store.notes_for_course(course.id).len()),
            ]);
        }
        println!("{table}\n");
    }

    let recent = store.recent(session.config.recent_notes);
    if recent.is_empty() {
        println!("No recent notes.");
        return Ok(());
    }

    println!("Recent notes:");
    for note in recent {
        let when = note
            .last_touched()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  [{}] {} ({}, {})",
            note.id,
            note.title,
            directory.name_of(note.course),
            when
        );
        let text = preview(&note.content);
        if !text.is_empty() {
            println!("      {text}");
        }
    }

    Ok(())
}
