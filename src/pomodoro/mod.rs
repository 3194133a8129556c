//! In-memory pomodoro timer. Nothing here is persisted, a restart loses the running session
//! and the session count.

pub mod runner;

use std::{fmt::Display, time::Duration};

use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Focus => write!(f, "Focus"),
            Phase::ShortBreak => write!(f, "Short break"),
            Phase::LongBreak => write!(f, "Long break"),
        }
    }
}

/// Length of each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PomodoroConfig {
    pub focus: Duration,
    pub short_break: Duration,
    pub long_break: Duration,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            focus: Duration::from_secs(25 * 60),
            short_break: Duration::from_secs(5 * 60),
            long_break: Duration::from_secs(15 * 60),
        }
    }
}

fn phase_length(minutes: u64) -> Result<Duration> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow!("{minutes} minutes is too long for a pomodoro phase"))
}

impl PomodoroConfig {
    pub fn from_minutes(focus: u64, short_break: u64, long_break: u64) -> Result<Self> {
        Ok(Self {
            focus: phase_length(focus)?,
            short_break: phase_length(short_break)?,
            long_break: phase_length(long_break)?,
        })
    }

    pub fn length(&self, phase: Phase) -> Duration {
        match phase {
            Phase::Focus => self.focus,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
    }
}

/// Result of a single one second tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The timer is stopped, nothing changed.
    Idle,
    Counting { remaining_seconds: u64 },
    PhaseFinished { finished: Phase, next: Phase },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomodoroTimer {
    config: PomodoroConfig,
    phase: Phase,
    remaining_seconds: u64,
    running: bool,
    sessions: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(PomodoroConfig::default())
    }
}

impl PomodoroTimer {
    /// Creates a stopped timer at the start of a focus phase.
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            config,
            phase: Phase::Focus,
            remaining_seconds: config.focus.as_secs(),
            running: false,
            sessions: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Completed focus phases.
    pub fn sessions(&self) -> u32 {
        self.sessions
    }

    pub fn config(&self) -> &PomodoroConfig {
        &self.config
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stops and goes back to a full focus phase. Completed sessions are kept.
    pub fn reset(&mut self) {
        self.running = false;
        self.enter(Phase::Focus);
    }

    /// Jumps to a short break right away. Whether the timer runs is left as is.
    pub fn short_break(&mut self) {
        self.enter(Phase::ShortBreak);
    }

    pub fn long_break(&mut self) {
        self.enter(Phase::LongBreak);
    }

    /// Advances the countdown by one second. The phase changes on the tick that reaches zero:
    /// a finished focus counts as a session and is followed by a short break, any break is
    /// followed by focus.
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Counting {
                remaining_seconds: self.remaining_seconds,
            };
        }

        let finished = self.phase;
        let next = match finished {
            Phase::Focus => {
                self.sessions += 1;
                Phase::ShortBreak
            }
            Phase::ShortBreak | Phase::LongBreak => Phase::Focus,
        };
        self.enter(next);
        TickOutcome::PhaseFinished { finished, next }
    }

    /// Remaining time as `MM:SS`.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.remaining_seconds = self.config.length(phase).as_secs();
    }
}
