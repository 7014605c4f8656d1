//! The `studydesk courses` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use studydesk_core::model::{Attachment, CourseForm, CourseId};
use studydesk_core::{CourseDirectory, NoteStore};

use crate::CourseAction;

use super::connect;

pub async fn execute(action: CourseAction, config_path: Option<PathBuf>) -> Result<()> {
    let session = connect(config_path)?;
    let mut directory = CourseDirectory::new(session.api.clone());

    match action {
        CourseAction::List => {
            let mut notes = NoteStore::new(session.api.clone());
            let (courses, notes_loaded) =
                futures::join!(directory.fetch_all(), notes.fetch_all());
            courses?;
            if let Err(e) = notes_loaded {
                eprintln!("Warning: {e}");
            }

            if directory.courses().is_empty() {
                println!("No courses yet. Create one with `studydesk courses create`.");
                return Ok(());
            }

            let mut table = Table::new();
            table.set_header(vec!["ID", "Name", "Instructor", "Notes", "Syllabus"]);
            for course in directory.courses() {
                table.add_row(vec![
                    Cell::new(course.id),
                    Cell::new(&course.name),
                    Cell::new(&course.instructor),
                    Cell::new(notes.notes_for_course(course.id).len()),
                    Cell::new(course.syllabus.as_deref().unwrap_or("-")),
                ]);
            }
            println!("{table}");
        }
        CourseAction::Create {
            name,
            instructor,
            syllabus,
        } => {
            let form = CourseForm {
                name,
                instructor,
                syllabus: Some(Attachment::from_path(&syllabus)?),
            };
            let id = directory.add(&form).await?;
            println!("Created course {id}: {}", directory.name_of(id));
        }
        CourseAction::Update {
            id,
            name,
            instructor,
            syllabus,
        } => {
            let id = CourseId(id);
            let current = directory.load(id).await?;

            let form = CourseForm {
                name: name.unwrap_or(current.name),
                instructor: instructor.unwrap_or(current.instructor),
                syllabus: syllabus
                    .as_deref()
                    .map(Attachment::from_path)
                    .transpose()?,
            };
            directory.update(id, &form).await?;
            println!("Updated course {id}: {}", directory.name_of(id));
        }
        CourseAction::Delete { id } => {
            let id = CourseId(id);
            directory.remove(id).await?;
            println!("Deleted course {id}");
        }
    }

    Ok(())
}
