pub mod notes;
pub mod output;
pub mod pomodoro;
pub mod projects;
pub mod settings;
pub mod tasks;

use std::{fmt::Display, path::PathBuf, sync::Arc};

use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use notes::{process_note_command, NoteCommand};
use output::{print_dates, print_summary, Palette};
use pomodoro::{process_pomodoro_command, PomodoroCommand};
use projects::{process_project_command, ProjectCommand};
use settings::{process_clear_command, process_theme_command, ThemeCommand};
use tasks::{process_task_command, TaskCommand};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    dashboard::Dashboard,
    storage::store::FileStore,
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
        time::parse_user_date,
    },
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "Dayboard", version, long_about = None)]
#[command(about = "Per-day to-do list, kanban board, notes and pomodoro timer", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print trace logs to stderr")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        short,
        global = true,
        help = "Day to work with. Examples are \"2025-03-15\", \"yesterday\", \"15/03/2025\". Defaults to today"
    )]
    date: Option<String>,
    #[arg(long, global = true, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "List every day that has data, newest first")]
    Dates,
    #[command(about = "Show tasks, projects and notes of a day")]
    Show,
    #[command(about = "Manage the to-do list")]
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    #[command(about = "Manage the kanban board")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    #[command(about = "Manage notes")]
    Note {
        #[command(subcommand)]
        command: NoteCommand,
    },
    #[command(about = "Run a pomodoro timer in this terminal. Progress isn't saved")]
    Pomodoro {
        #[command(flatten)]
        command: PomodoroCommand,
    },
    #[command(about = "Show or change the color theme")]
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommand>,
    },
    #[command(about = "Delete all stored data. Asks for confirmation")]
    Clear {
        #[arg(long, help = "Don't ask for confirmation")]
        yes: bool,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .clone()
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let store = Arc::new(FileStore::new(app_dir.join("storage"))?);
    let dashboard = Dashboard::new(store, Arc::new(DefaultClock));
    let date = selected_date(args.date.as_deref(), args.date_style, &DefaultClock)?;
    let palette = Palette::for_theme(dashboard.theme.get().await?);
    debug!("Working with {date} in {app_dir:?}");

    match args.commands {
        Commands::Dates => {
            print_dates(&dashboard.dates().await?, &palette);
            Ok(())
        }
        Commands::Show => {
            print_summary(&dashboard.summary(date).await?, &palette);
            Ok(())
        }
        Commands::Task { command } => {
            process_task_command(command, &dashboard, date, &palette).await
        }
        Commands::Project { command } => {
            process_project_command(command, &dashboard, date, &palette).await
        }
        Commands::Note { command } => {
            process_note_command(command, &dashboard, date, &palette).await
        }
        Commands::Pomodoro { command } => process_pomodoro_command(command, palette).await,
        Commands::Theme { command } => {
            process_theme_command(command.unwrap_or_default(), &dashboard).await
        }
        Commands::Clear { yes } => process_clear_command(yes, &dashboard).await,
    }
}

fn selected_date(date: Option<&str>, date_style: DateStyle, clock: &dyn Clock) -> Result<NaiveDate> {
    let Some(date) = date else {
        return Ok(clock.today());
    };
    parse_user_date(date, clock.time(), date_style.into()).map_err(|e| {
        Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()
    })
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use clap::{CommandFactory, Parser};

    use crate::utils::clock::FixedClock;

    use super::{selected_date, Args, DateStyle};

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_pomodoro_lengths_are_bounded() {
        assert!(Args::try_parse_from(["dayboard", "pomodoro", "--focus", "50"]).is_ok());
        assert!(Args::try_parse_from(["dayboard", "pomodoro", "--focus", "0"]).is_err());
        assert!(Args::try_parse_from(["dayboard", "pomodoro", "--long-break", "1441"]).is_err());
        assert!(
            Args::try_parse_from(["dayboard", "pomodoro", "--short-break", "307445734561825860"])
                .is_err()
        );
    }

    #[test]
    fn test_selected_date_defaults_to_today() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 23, 59, 0).unwrap());
        assert_eq!(
            selected_date(None, DateStyle::Uk, &clock).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            selected_date(Some("2024-01-03"), DateStyle::Uk, &clock).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
        );
        assert!(selected_date(Some("someday maybe"), DateStyle::Us, &clock).is_err());
    }
}
