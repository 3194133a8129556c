use ansi_term::{Colour, Style};
use chrono::{DateTime, Local, Utc};

use crate::{
    dashboard::{dates::DateOption, kanban::KanbanColumn, theme::Theme, DaySummary},
    storage::entities::{NoteEntity, TaskEntity},
    utils::time::date_key,
};

/// Styles used for printing. Dark terminals get brighter accents.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub heading: Style,
    pub accent: Style,
    pub muted: Style,
    pub done: Style,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                heading: Colour::Blue.bold(),
                accent: Colour::Yellow.normal(),
                muted: Style::new().dimmed(),
                done: Style::new().strikethrough().dimmed(),
            },
            Theme::Dark => Self {
                heading: Colour::Cyan.bold(),
                accent: Colour::Yellow.bold(),
                muted: Colour::White.dimmed(),
                done: Colour::Green.strikethrough(),
            },
        }
    }
}

/// Minutes as `HH:MM`.
pub fn format_minutes(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn format_timestamp(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%b %e, %Y %H:%M").to_string()
}

pub fn print_dates(options: &[DateOption], palette: &Palette) {
    for option in options {
        if option.is_today {
            println!("{}", palette.accent.paint(format!("{} * (Today)", option.key)));
        } else {
            println!("{}", option.key);
        }
    }
}

pub fn print_tasks(tasks: &[TaskEntity], palette: &Palette) {
    if tasks.is_empty() {
        println!("{}", palette.muted.paint("No tasks for this day."));
        return;
    }
    for task in tasks {
        let mark = if task.completed { "[x]" } else { "[ ]" };
        let title = format!(
            "{} ({})",
            task.title,
            format_minutes(task.duration_minutes.into())
        );
        let title = if task.completed {
            palette.done.paint(title)
        } else {
            Style::new().paint(title)
        };
        println!("{mark} {}\t{title}", task.id);
        println!(
            "{}",
            palette
                .muted
                .paint(format!("      Added: {}", format_timestamp(task.created_at)))
        );
        if let (Some(completed_at), Some(actual)) = (task.completed_at, task.actual_minutes()) {
            println!(
                "{}",
                palette.muted.paint(format!(
                    "      Completed: {}\n      Predicted: {} | Actual: {}",
                    format_timestamp(completed_at),
                    format_minutes(task.duration_minutes.into()),
                    format_minutes(actual)
                ))
            );
        }
    }
}

pub fn print_columns(columns: &[KanbanColumn], palette: &Palette) {
    for column in columns {
        println!("{}", palette.heading.paint(column.status.label()));
        if column.projects.is_empty() {
            println!("  {}", palette.muted.paint("-"));
        }
        for project in &column.projects {
            println!("  {}\t{}", project.id, project.title);
            println!(
                "{}",
                palette
                    .muted
                    .paint(format!("    Added: {}", format_timestamp(project.created_at)))
            );
        }
    }
}

pub fn print_notes(notes: &[NoteEntity], palette: &Palette) {
    if notes.is_empty() {
        println!("{}", palette.muted.paint("No notes for this day."));
        return;
    }
    for note in notes {
        println!("{}\t{}", note.id, note.content);
        println!(
            "{}",
            palette
                .muted
                .paint(format!("    Added: {}", format_timestamp(note.created_at)))
        );
    }
}

pub fn print_summary(summary: &DaySummary, palette: &Palette) {
    let date = date_key(summary.date);
    println!("{}", palette.heading.paint(format!("To-Do List - {date}")));
    print_tasks(&summary.tasks, palette);
    println!();
    println!("{}", palette.heading.paint(format!("Projects - {date}")));
    print_columns(&summary.columns, palette);
    println!();
    println!("{}", palette.heading.paint(format!("Notes - {date}")));
    print_notes(&summary.notes, palette);
}
