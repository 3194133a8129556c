use std::io::Write;

use anyhow::Result;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    select,
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    pomodoro::{
        runner::{TimerCommand, TimerEvent, TimerRunner},
        PomodoroConfig, PomodoroTimer, TickOutcome,
    },
    utils::clock::DefaultClock,
};

use super::output::Palette;

const MAX_PHASE_MINUTES: u64 = 24 * 60;

#[derive(Debug, clap::Args)]
pub struct PomodoroCommand {
    #[arg(
        long,
        default_value_t = 25,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PHASE_MINUTES),
        help = "Length of a focus phase in minutes"
    )]
    focus: u64,
    #[arg(
        long,
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PHASE_MINUTES),
        help = "Length of a short break in minutes"
    )]
    short_break: u64,
    #[arg(
        long,
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..=MAX_PHASE_MINUTES),
        help = "Length of a long break in minutes"
    )]
    long_break: u64,
    #[arg(long, help = "Start counting down right away")]
    start: bool,
}

/// Runs an interactive timer in the terminal until the user quits or presses Ctrl-C.
pub async fn process_pomodoro_command(
    PomodoroCommand {
        focus,
        short_break,
        long_break,
        start,
    }: PomodoroCommand,
    palette: Palette,
) -> Result<()> {
    let config = PomodoroConfig::from_minutes(focus, short_break, long_break)?;
    let mut timer = PomodoroTimer::new(config);
    if start {
        timer.start();
    }

    println!(
        "{}",
        palette.muted.paint(
            "Commands: s start, p stop, r reset, b short break, l long break, q quit (then Enter)"
        )
    );
    render_status(&timer, &palette);

    let shutdown = CancellationToken::new();
    let (sender, receiver) = mpsc::channel::<TimerCommand>(10);

    let input = tokio::spawn(forward_stdin(sender, shutdown.clone()));
    let signals = tokio::spawn(detect_shutdown(shutdown.clone()));

    let runner = TimerRunner::new(
        timer,
        receiver,
        shutdown.clone(),
        Box::new(DefaultClock),
        Box::new(move |timer: &PomodoroTimer, event: TimerEvent| {
            render_event(timer, event, &palette)
        }),
    );
    let timer = runner.run().await;

    shutdown.cancel();
    input.abort();
    signals.abort();

    println!();
    println!("Sessions: {}", timer.sessions());
    info!("Pomodoro finished with {} sessions", timer.sessions());
    Ok(())
}

/// Cancels the token on Ctrl-C.
async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}

/// Turns stdin lines into timer commands. Closing stdin keeps the timer alive until shutdown.
async fn forward_stdin(sender: mpsc::Sender<TimerCommand>, shutdown: CancellationToken) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = select! {
            _ = shutdown.cancelled() => return,
            line = lines.next_line() => line,
        };
        match line {
            Ok(Some(line)) if matches!(line.trim(), "q" | "quit") => {
                shutdown.cancel();
                return;
            }
            Ok(Some(line)) if line.trim().is_empty() => (),
            Ok(Some(line)) => match line.parse::<TimerCommand>() {
                Ok(command) => {
                    if sender.send(command).await.is_err() {
                        return;
                    }
                }
                Err(e) => eprintln!("{e}"),
            },
            Ok(None) => {
                debug!("Stdin closed");
                shutdown.cancelled().await;
                return;
            }
            Err(e) => {
                error!("Failed to read stdin {e:?}");
                shutdown.cancelled().await;
                return;
            }
        }
    }
}

fn render_event(timer: &PomodoroTimer, event: TimerEvent, palette: &Palette) {
    match event {
        TimerEvent::Tick(TickOutcome::Idle) => return,
        TimerEvent::Tick(TickOutcome::PhaseFinished { finished, next }) => {
            // The bell makes the terminal signal the end of a phase.
            println!(
                "\r{}\x07",
                palette
                    .accent
                    .paint(format!("{finished} finished, time for {next}          "))
            );
        }
        TimerEvent::Tick(TickOutcome::Counting { .. }) | TimerEvent::Command(_) => (),
    }
    render_status(timer, palette);
}

fn render_status(timer: &PomodoroTimer, palette: &Palette) {
    let state = if timer.is_running() { "" } else { " (stopped)" };
    print!(
        "\r{} {}{}  Sessions: {}   ",
        palette.heading.paint(timer.phase().to_string()),
        timer.display(),
        state,
        timer.sessions()
    );
    let _ = std::io::stdout().flush();
}
