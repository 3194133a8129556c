use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_english::{parse_date_string, Dialect};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a date to a collection key in dayboard.
pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

/// Parses a stored collection key. Only strict `YYYY-MM-DD` calendar dates are accepted.
pub fn parse_date_key(key: &str) -> Option<NaiveDate> {
    if key.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Resolves a user supplied date. Accepts date keys directly and falls back to natural
/// expressions like "yesterday" or "15/03/2025".
pub fn parse_user_date(input: &str, now: DateTime<Utc>, dialect: Dialect) -> Result<NaiveDate> {
    let input = input.trim();
    if let Some(date) = parse_date_key(input) {
        return Ok(date);
    }
    parse_date_string(input, now, dialect)
        .map(|v| v.date_naive())
        .map_err(|e| anyhow!("Can't parse {input} into a date: {e}"))
}
