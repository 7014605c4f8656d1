//! The `studydesk notes` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use tokio::io::{AsyncBufReadExt, BufReader};

use studydesk_core::autosave::Autosave;
use studydesk_core::model::{CourseId, Note, NoteDraft, NoteId};
use studydesk_core::notes::{preview, NoteLookup};
use studydesk_core::{CourseDirectory, NoteStore};

use crate::NoteAction;

use super::connect;

pub async fn execute(action: NoteAction, config_path: Option<PathBuf>) -> Result<()> {
    let session = connect(config_path)?;
    let mut store = NoteStore::new(session.api.clone());

    match action {
        NoteAction::List { course } => {
            let mut directory = CourseDirectory::new(session.api.clone());
            let (courses, notes) = futures::join!(directory.fetch_all(), store.fetch_all());
            notes?;
            if let Err(e) = courses {
                eprintln!("Warning: {e}");
            }

            let listed: Vec<&Note> = match course {
                Some(id) => store.notes_for_course(CourseId(id)).iter().collect(),
                None => store.notes().iter().collect(),
            };
            if listed.is_empty() {
                println!("No notes found.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec!["ID", "Title", "Course", "Updated", "Preview"]);
            for note in listed {
                let updated = note
                    .last_touched()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![
                    Cell::new(note.id),
                    Cell::new(&note.title),
                    Cell::new(directory.name_of(note.course)),
                    Cell::new(updated),
                    Cell::new(preview(&note.content)),
                ]);
            }
            println!("{table}");
        }
        NoteAction::Create { course, title } => {
            let draft = NoteDraft::new(CourseId(course), &title)?;
            let id = store.add(&draft).await?;
            println!("Created note {id}: {}", draft.title);
        }
        NoteAction::Show { id, course } => {
            let id = NoteId(id);
            match course {
                Some(course) => {
                    refresh(&mut store, id).await?;
                    match store.open(CourseId(course), id) {
                        NoteLookup::Found(note) => print_note(note),
                        NoteLookup::Loading => anyhow::bail!("notes are still loading"),
                        NoteLookup::Redirect(course) => {
                            eprintln!("Note {id} not found, showing course {course} instead.");
                            let notes = store.notes_for_course(course);
                            if notes.is_empty() {
                                println!("Course {course} has no notes.");
                            }
                            for note in notes {
                                println!("{}\t{}", note.id, note.title);
                            }
                        }
                    }
                }
                None => print_note(&store.load(id).await?),
            }
        }
        NoteAction::Edit {
            id,
            title,
            content,
            content_file,
        } => {
            let id = NoteId(id);
            let current = store.load(id).await?;

            let content = match (content, content_file) {
                (Some(c), _) => c,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                (None, None) => current.content.clone(),
            };
            let draft = NoteDraft {
                title: title.unwrap_or_else(|| current.title.clone()),
                content,
                course: current.course,
            };
            anyhow::ensure!(!draft.title.trim().is_empty(), "Note title is required");

            store.update(id, &draft).await?;
            println!("Saved note {id}");
        }
        NoteAction::Write { id } => {
            let id = NoteId(id);
            let note = store.load(id).await?;
            let title = note.title.clone();
            let mut content = note.content.clone();

            let mut autosave = Autosave::new(
                session.api.clone(),
                id,
                note.course,
                session.config.autosave_delay(),
            );

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                content.push_str("<p>");
                content.push_str(&line);
                content.push_str("</p>");
                autosave.edit(&title, &content);
            }

            autosave.save_now(&title, &content).await?;
            let status = autosave.status();
            if let Some(saved) = status.last_saved {
                println!("Saved note {id} at {}", saved.format("%H:%M:%S"));
            }
        }
        NoteAction::Delete { id } => {
            let id = NoteId(id);
            store.remove(id).await?;
            println!("Deleted note {id}");
        }
    }

    Ok(())
}

/// Load every note, then the requested one. A note the backend no longer
/// has is left out so that opening it redirects to its course.
async fn refresh(store: &mut NoteStore, id: NoteId) -> Result<()> {
    store.fetch_all().await?;
    match store.load(id).await {
        Ok(_) => {}
        Err(e) if e.is_not_found() => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn print_note(note: &Note) {
    println!("# {}", note.title);
    if let Some(updated) = note.last_touched() {
        println!("(last updated {})", updated.format("%Y-%m-%d %H:%M"));
    }
    println!();
    println!("{}", note.content);
}
