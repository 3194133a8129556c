use std::{fmt::Display, str::FromStr, time::Duration};

use anyhow::bail;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::utils::clock::Clock;

use super::{PomodoroTimer, TickOutcome};

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Controls accepted by a running [TimerRunner].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start,
    Stop,
    Reset,
    ShortBreak,
    LongBreak,
}

impl FromStr for TimerCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "start" => Ok(Self::Start),
            "p" | "stop" | "pause" => Ok(Self::Stop),
            "r" | "reset" => Ok(Self::Reset),
            "b" | "short" => Ok(Self::ShortBreak),
            "l" | "long" => Ok(Self::LongBreak),
            other => bail!("Unknown timer command {other}"),
        }
    }
}

impl Display for TimerCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerCommand::Start => write!(f, "start"),
            TimerCommand::Stop => write!(f, "stop"),
            TimerCommand::Reset => write!(f, "reset"),
            TimerCommand::ShortBreak => write!(f, "short break"),
            TimerCommand::LongBreak => write!(f, "long break"),
        }
    }
}

impl PomodoroTimer {
    pub fn apply(&mut self, command: TimerCommand) {
        match command {
            TimerCommand::Start => self.start(),
            TimerCommand::Stop => self.stop(),
            TimerCommand::Reset => self.reset(),
            TimerCommand::ShortBreak => self.short_break(),
            TimerCommand::LongBreak => self.long_break(),
        }
    }
}

/// Something that changed the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Command(TimerCommand),
    Tick(TickOutcome),
}

pub type TimerObserver = Box<dyn FnMut(&PomodoroTimer, TimerEvent) + Send>;

/// Drives a [PomodoroTimer] in real time. Ticks once per interval while the timer runs and
/// applies commands as they arrive.
pub struct TimerRunner {
    timer: PomodoroTimer,
    commands: mpsc::Receiver<TimerCommand>,
    shutdown: CancellationToken,
    clock: Box<dyn Clock>,
    tick_interval: Duration,
    observer: TimerObserver,
}

impl TimerRunner {
    pub fn new(
        timer: PomodoroTimer,
        commands: mpsc::Receiver<TimerCommand>,
        shutdown: CancellationToken,
        clock: Box<dyn Clock>,
        observer: TimerObserver,
    ) -> Self {
        Self {
            timer,
            commands,
            shutdown,
            clock,
            tick_interval: DEFAULT_TICK_INTERVAL,
            observer,
        }
    }

    /// Executes the timer event loop until shutdown or until every command sender is gone.
    /// Returns the timer as it was left.
    pub async fn run(mut self) -> PomodoroTimer {
        let mut next_tick = self.clock.instant() + self.tick_interval;
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("Timer runner cancelled");
                    break;
                }
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("Timer command channel closed");
                        break;
                    };
                    let was_running = self.timer.is_running();
                    self.timer.apply(command);
                    // A fresh start counts a full second before the first tick.
                    if !was_running && self.timer.is_running() {
                        next_tick = self.clock.instant() + self.tick_interval;
                    }
                    debug!("Applied timer command {command}");
                    (self.observer)(&self.timer, TimerEvent::Command(command));
                }
                _ = self.clock.sleep_until(next_tick), if self.timer.is_running() => {
                    next_tick += self.tick_interval;
                    let outcome = self.timer.tick();
                    if let TickOutcome::PhaseFinished { finished, next } = outcome {
                        info!("{finished} finished, starting {next}. Sessions: {}", self.timer.sessions());
                    }
                    (self.observer)(&self.timer, TimerEvent::Tick(outcome));
                }
            }
        }
        self.timer
    }
}
