use std::{fmt::Display, str::FromStr};

use anyhow::{bail, Result};
use tracing::debug;

use crate::storage::{store::KeyValueStore, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => bail!("Unknown theme {s}. Expected light or dark"),
        }
    }
}

/// Theme preference kept as a plain string under [THEME_KEY].
pub struct ThemePreference<S> {
    store: S,
}

impl<S: KeyValueStore> ThemePreference<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Anything that isn't a known theme reads as [Theme::Light].
    pub async fn get(&self) -> Result<Theme> {
        let stored = self.store.get_item(THEME_KEY).await?;
        Ok(stored
            .and_then(|v| {
                v.parse()
                    .inspect_err(|e| debug!("Ignoring stored theme: {e}"))
                    .ok()
            })
            .unwrap_or_default())
    }

    pub async fn set(&self, theme: Theme) -> Result<()> {
        self.store.set_item(THEME_KEY, theme.as_str()).await
    }

    pub async fn toggle(&self) -> Result<Theme> {
        let theme = self.get().await?.toggled();
        self.set(theme).await?;
        Ok(theme)
    }
}
