use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;

use crate::{
    dashboard::{
        todo::{DurationDraft, DurationStep, TaskDraft},
        Dashboard,
    },
    storage::{entities::RecordId, store::KeyValueStore},
};

use super::output::{print_tasks, Palette};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    #[command(about = "Add a task on top of the day's list")]
    Add {
        title: String,
        #[arg(
            short,
            long,
            value_parser = parse_duration_minutes,
            help = "Planned duration in minutes. Must be a multiple of 30"
        )]
        minutes: DurationDraft,
    },
    #[command(about = "Mark a task as done, or open it again")]
    Toggle { id: RecordId },
    #[command(about = "Add 30 minutes to a task's planned duration")]
    Longer { id: RecordId },
    #[command(about = "Take 30 minutes off a task's planned duration, down to 0")]
    Shorter { id: RecordId },
    #[command(about = "Delete a task")]
    Remove { id: RecordId },
    #[command(about = "List the day's tasks")]
    List,
}

fn parse_duration_minutes(value: &str) -> Result<DurationDraft, String> {
    let minutes = value
        .parse::<u32>()
        .map_err(|e| format!("{value} isn't a number of minutes: {e}"))?;
    DurationDraft::from_minutes(minutes).ok_or_else(|| {
        format!(
            "{minutes} isn't a multiple of {} minutes",
            DurationDraft::STEP_MINUTES
        )
    })
}

pub async fn process_task_command<S: KeyValueStore + Clone>(
    command: TaskCommand,
    dashboard: &Dashboard<S>,
    date: NaiveDate,
    palette: &Palette,
) -> Result<()> {
    let todo = &dashboard.todo;
    match command {
        TaskCommand::Add { title, minutes } => {
            let draft = TaskDraft {
                title,
                duration: minutes,
            };
            if let Some(task) = todo.add(date, &draft).await? {
                println!("{}", task.id);
            }
        }
        TaskCommand::Toggle { id } => {
            todo.toggle(date, id).await?;
        }
        TaskCommand::Longer { id } => {
            if let Some(task) = todo.adjust_duration(date, id, DurationStep::Increase).await? {
                println!("{}", task.duration_minutes);
            }
        }
        TaskCommand::Shorter { id } => {
            if let Some(task) = todo.adjust_duration(date, id, DurationStep::Decrease).await? {
                println!("{}", task.duration_minutes);
            }
        }
        TaskCommand::Remove { id } => {
            todo.remove(date, id).await?;
        }
        TaskCommand::List => print_tasks(&todo.list(date).await?, palette),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::parse_duration_minutes;

    #[test]
    fn test_parse_duration_minutes() {
        assert_eq!(parse_duration_minutes("60").unwrap().minutes(), 60);
        assert_eq!(parse_duration_minutes("0").unwrap().minutes(), 0);
        assert!(parse_duration_minutes("45").is_err());
        assert!(parse_duration_minutes("-30").is_err());
        assert!(parse_duration_minutes("hour").is_err());
    }
}
