use std::collections::BTreeSet;

use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    storage::{
        collection::{read_date_keys, CollectionName},
        store::KeyValueStore,
    },
    utils::time::{date_key, parse_date_key},
};

/// One entry of the date picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateOption {
    pub key: String,
    pub is_today: bool,
}

/// Builds the date picker from raw collection keys. Keys that aren't calendar dates are dropped,
/// duplicates collapse and the newest day comes first. With nothing stored today is the only
/// option.
pub fn aggregate_dates(keys: impl IntoIterator<Item = String>, today: NaiveDate) -> Vec<DateOption> {
    let today_key = date_key(today);
    let mut dates = keys
        .into_iter()
        .filter(|key| parse_date_key(key).is_some())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>();

    if dates.is_empty() {
        dates.push(today_key.clone());
    }

    dates
        .into_iter()
        .map(|key| DateOption {
            is_today: key == today_key,
            key,
        })
        .collect()
}

/// Scans every collection for date keys.
pub async fn collect_date_options(
    store: &impl KeyValueStore,
    today: NaiveDate,
) -> Result<Vec<DateOption>> {
    let mut keys = vec![];
    for name in CollectionName::ALL {
        keys.extend(read_date_keys(store, name).await?);
    }
    Ok(aggregate_dates(keys, today))
}
