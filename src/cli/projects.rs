use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use crate::{
    dashboard::Dashboard,
    storage::{
        entities::{ProjectStatus, RecordId},
        store::KeyValueStore,
    },
};

use super::output::{print_columns, Palette};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    #[command(about = "Add a project to the To Do column")]
    Add { title: String },
    #[command(about = "Move a project to another column: todo, inprogress or done")]
    Move {
        id: RecordId,
        status: ProjectStatus,
    },
    #[command(about = "Delete a project")]
    Remove { id: RecordId },
    #[command(about = "Show the day's board")]
    List,
}

pub async fn process_project_command<S: KeyValueStore + Clone>(
    command: ProjectCommand,
    dashboard: &Dashboard<S>,
    date: NaiveDate,
    palette: &Palette,
) -> Result<()> {
    let kanban = &dashboard.kanban;
    match command {
        ProjectCommand::Add { title } => {
            if let Some(project) = kanban.add(date, &title).await? {
                println!("{}", project.id);
            }
        }
        ProjectCommand::Move { id, status } => {
            kanban.move_project(date, id, status).await?;
        }
        ProjectCommand::Remove { id } => {
            kanban.remove(date, id).await?;
        }
        ProjectCommand::List => print_columns(&kanban.columns(date).await?, palette),
    }
    Ok(())
}
