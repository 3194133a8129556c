use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Subcommand;

use crate::{
    dashboard::{theme::Theme, Confirm, Dashboard},
    storage::store::KeyValueStore,
};

#[derive(Subcommand, Debug, Default)]
pub enum ThemeCommand {
    #[default]
    #[command(about = "Print the current theme")]
    Show,
    #[command(about = "Use the given theme: light or dark")]
    Set { theme: Theme },
    #[command(about = "Switch between light and dark")]
    Toggle,
}

pub async fn process_theme_command<S: KeyValueStore + Clone>(
    command: ThemeCommand,
    dashboard: &Dashboard<S>,
) -> Result<()> {
    let theme = match command {
        ThemeCommand::Show => dashboard.theme.get().await?,
        ThemeCommand::Set { theme } => {
            dashboard.theme.set(theme).await?;
            theme
        }
        ThemeCommand::Toggle => dashboard.theme.toggle().await?,
    };
    println!("{theme}");
    Ok(())
}

/// Asks on the terminal. Only an explicit yes counts.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        print!("{message} [y/N] ");
        io::stdout().flush()?;
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

/// Used with `--yes`.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _message: &str) -> Result<bool> {
        Ok(true)
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub async fn process_clear_command<S: KeyValueStore + Clone>(
    yes: bool,
    dashboard: &Dashboard<S>,
) -> Result<()> {
    let mut confirm: Box<dyn Confirm> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirm)
    };
    if dashboard.clear_all_data(confirm.as_mut()).await? {
        println!("All data cleared");
    } else {
        println!("Nothing was cleared");
    }
    Ok(())
}
