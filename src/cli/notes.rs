use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use crate::{
    dashboard::Dashboard,
    storage::{entities::RecordId, store::KeyValueStore},
};

use super::output::{print_notes, Palette};

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    #[command(about = "Write a note for the day")]
    Add { content: String },
    #[command(about = "Delete a note")]
    Remove { id: RecordId },
    #[command(about = "List the day's notes, newest first")]
    List,
}

pub async fn process_note_command<S: KeyValueStore + Clone>(
    command: NoteCommand,
    dashboard: &Dashboard<S>,
    date: NaiveDate,
    palette: &Palette,
) -> Result<()> {
    let notes = &dashboard.notes;
    match command {
        NoteCommand::Add { content } => {
            if let Some(note) = notes.add(date, &content).await? {
                println!("{}", note.id);
            }
        }
        NoteCommand::Remove { id } => {
            notes.remove(date, id).await?;
        }
        NoteCommand::List => print_notes(&notes.list(date).await?, palette),
    }
    Ok(())
}
