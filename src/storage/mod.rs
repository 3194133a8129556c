//!  Storage is organized through [store::KeyValueStore] and [collection::CollectionRepository].
//!  The basic idea is:
//!   - There is a key/value space, by default a directory with one file per key.
//!   - Each collection (tasks, notes, projects, pomodoros) lives under its own key as a JSON
//!     mapping from a `YYYY-MM-DD` date key to the records of that day.
//!   - Collections are always read and written as a whole.

pub mod collection;
pub mod entities;
pub mod store;

/// Key holding the theme preference as a plain string.
pub const THEME_KEY: &str = "theme";
