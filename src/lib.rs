//! Per-day productivity dashboard for the terminal: a to-do list, a kanban board, notes and a
//! pomodoro timer. Everything is stored locally, one JSON document per collection keyed by day.
//!

pub mod cli;
pub mod dashboard;
pub mod pomodoro;
pub mod storage;
pub mod utils;
