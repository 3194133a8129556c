use std::{collections::BTreeMap, fmt::Display, marker::PhantomData};

use anyhow::Result;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::utils::time::date_key;

use super::{
    entities::{DatedRecord, RecordId},
    store::KeyValueStore,
};

/// Collections known to the dashboard. Each is stored under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CollectionName {
    Tasks,
    Notes,
    /// Reserved for pomodoro history. Nothing writes it yet but its dates still count.
    Pomodoros,
    Projects,
}

impl CollectionName {
    pub const ALL: [CollectionName; 4] = [Self::Tasks, Self::Notes, Self::Pomodoros, Self::Projects];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Notes => "notes",
            Self::Pomodoros => "pomodoros",
            Self::Projects => "projects",
        }
    }
}

impl Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Date key to that day's records, exactly as stored. Keys are kept as raw strings since foreign
/// data may contain keys that aren't dates.
pub type RawCollection = BTreeMap<String, Value>;

/// Date key to the records of that day that could be decoded.
pub type DatedCollection<R> = BTreeMap<String, Vec<R>>;

/// One entry of a day's array.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRecord<R> {
    Known(R),
    /// A record that doesn't fit `R`. Kept verbatim so writing the day back doesn't lose it.
    Opaque(Value),
}

impl<R: DatedRecord + Serialize + DeserializeOwned> StoredRecord<R> {
    fn decode(value: Value) -> Self {
        match R::deserialize(&value) {
            Ok(record) => Self::Known(record),
            Err(e) => {
                warn!("Keeping record that can't be decoded as is: {e}");
                Self::Opaque(value)
            }
        }
    }

    fn into_value(self) -> serde_json::Result<Value> {
        match self {
            Self::Known(record) => serde_json::to_value(record),
            Self::Opaque(value) => Ok(value),
        }
    }

    /// Opaque records still answer to the `id` they carry.
    pub fn id(&self) -> Option<RecordId> {
        match self {
            Self::Known(record) => Some(record.id()),
            Self::Opaque(value) => value.get("id").and_then(Value::as_i64),
        }
    }

    pub fn known_mut(&mut self) -> Option<&mut R> {
        match self {
            Self::Known(record) => Some(record),
            Self::Opaque(_) => None,
        }
    }

    pub fn into_known(self) -> Option<R> {
        match self {
            Self::Known(record) => Some(record),
            Self::Opaque(_) => None,
        }
    }
}

/// Splits a stored day into records. A day that isn't an array holds nothing usable.
fn decode_day<R>(name: CollectionName, key: &str, day: Option<Value>) -> Vec<StoredRecord<R>>
where
    R: DatedRecord + Serialize + DeserializeOwned,
{
    match day {
        None => vec![],
        Some(Value::Array(values)) => values.into_iter().map(StoredRecord::decode).collect(),
        Some(other) => {
            warn!("Day {key} of {name} is not an array, dropping {other}");
            vec![]
        }
    }
}

/// Reads a whole collection without decoding its records. Absent and malformed values both
/// yield an empty collection.
pub async fn read_raw_collection(
    store: &impl KeyValueStore,
    name: CollectionName,
) -> Result<RawCollection> {
    let Some(raw) = store.get_item(name.key()).await? else {
        debug!("Collection {name} is not stored yet");
        return Ok(RawCollection::new());
    };
    match serde_json::from_str::<RawCollection>(&raw) {
        Ok(v) => Ok(v),
        Err(e) => {
            warn!("Collection {name} holds malformed data, treating it as empty: {e}");
            Ok(RawCollection::new())
        }
    }
}

/// Overwrites a whole collection in one call.
pub async fn write_raw_collection(
    store: &impl KeyValueStore,
    name: CollectionName,
    collection: &RawCollection,
) -> Result<()> {
    let value = serde_json::to_string(collection)?;
    store.set_item(name.key(), &value).await
}

/// Reads every day of a collection, skipping records that don't decode as `R`.
pub async fn read_collection<R>(
    store: &impl KeyValueStore,
    name: CollectionName,
) -> Result<DatedCollection<R>>
where
    R: DatedRecord + Serialize + DeserializeOwned,
{
    let collection = read_raw_collection(store, name)
        .await?
        .into_iter()
        .map(|(key, day)| {
            let records = decode_day::<R>(name, &key, Some(day))
                .into_iter()
                .filter_map(StoredRecord::into_known)
                .collect();
            (key, records)
        })
        .collect();
    Ok(collection)
}

/// Returns the raw keys of a collection.
pub async fn read_date_keys(store: &impl KeyValueStore, name: CollectionName) -> Result<Vec<String>> {
    Ok(read_raw_collection(store, name).await?.into_keys().collect())
}

/// Typed access to one collection. Every mutation is a read-modify-write of the entire
/// collection, so the last writer wins. Only the day being changed is decoded, every other day
/// is written back exactly as it was read.
pub struct CollectionRepository<S, R> {
    store: S,
    name: CollectionName,
    _record: PhantomData<fn() -> R>,
}

impl<S, R> CollectionRepository<S, R>
where
    S: KeyValueStore,
    R: DatedRecord + Serialize + DeserializeOwned,
{
    pub fn new(store: S, name: CollectionName) -> Self {
        Self {
            store,
            name,
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> CollectionName {
        self.name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn read(&self) -> Result<DatedCollection<R>> {
        read_collection(&self.store, self.name).await
    }

    /// Records filed under `date`, empty if the day has none.
    pub async fn records(&self, date: NaiveDate) -> Result<Vec<R>> {
        let key = date_key(date);
        let mut collection = read_raw_collection(&self.store, self.name).await?;
        Ok(decode_day::<R>(self.name, &key, collection.remove(&key))
            .into_iter()
            .filter_map(StoredRecord::into_known)
            .collect())
    }

    /// Lets `f` change the records of `date` and writes the collection back. The day is written
    /// even if `f` leaves it unchanged.
    #[instrument(skip_all, fields(collection = %self.name, %date))]
    pub async fn modify_day<T>(
        &self,
        date: NaiveDate,
        f: impl FnOnce(&mut Vec<StoredRecord<R>>) -> T,
    ) -> Result<T> {
        let key = date_key(date);
        let mut collection = read_raw_collection(&self.store, self.name).await?;
        let mut records = decode_day(self.name, &key, collection.remove(&key));
        let result = f(&mut records);

        let day = records
            .into_iter()
            .map(StoredRecord::into_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        collection.insert(key, Value::Array(day));
        write_raw_collection(&self.store, self.name, &collection).await?;
        Ok(result)
    }

    pub async fn prepend(&self, date: NaiveDate, record: R) -> Result<()> {
        self.modify_day(date, |records| records.insert(0, StoredRecord::Known(record)))
            .await
    }

    pub async fn append(&self, date: NaiveDate, record: R) -> Result<()> {
        self.modify_day(date, |records| records.push(StoredRecord::Known(record)))
            .await
    }

    /// Applies `patch` to every record with `id`. Returns the first patched record, `None` when
    /// no record matched.
    pub async fn update(
        &self,
        date: NaiveDate,
        id: RecordId,
        mut patch: impl FnMut(&mut R),
    ) -> Result<Option<R>>
    where
        R: Clone,
    {
        self.modify_day(date, |records| {
            let mut patched = None;
            for record in records
                .iter_mut()
                .filter_map(StoredRecord::known_mut)
                .filter(|v| v.id() == id)
            {
                patch(record);
                patched.get_or_insert_with(|| record.clone());
            }
            patched
        })
        .await
    }

    /// Filters out every record with `id`, opaque ones included. Returns the first removed record
    /// that could be decoded.
    pub async fn remove(&self, date: NaiveDate, id: RecordId) -> Result<Option<R>> {
        self.modify_day(date, |records| {
            let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(records)
                .into_iter()
                .partition(|v| v.id() == Some(id));
            *records = kept;
            removed.into_iter().find_map(StoredRecord::into_known)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::{json, Value};

    use crate::storage::{
        entities::NoteEntity,
        store::{KeyValueStore, MemoryStore},
    };

    use super::{read_collection, read_date_keys, CollectionName, CollectionRepository};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn note(id: i64, content: &str) -> NoteEntity {
        NoteEntity {
            id,
            content: content.into(),
            created_at: Utc.timestamp_millis_opt(id).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_malformed_collection_reads_as_empty() -> Result<()> {
        let store = MemoryStore::new();
        store.set_item("notes", "{not json").await?;
        let notes = read_collection::<NoteEntity>(&store, CollectionName::Notes).await?;
        assert!(notes.is_empty());

        store.set_item("notes", "[1, 2, 3]").await?;
        let notes = read_collection::<NoteEntity>(&store, CollectionName::Notes).await?;
        assert!(notes.is_empty());
        assert!(read_date_keys(&store, CollectionName::Notes).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_date_keys_ignore_record_shape() -> Result<()> {
        let store = MemoryStore::new();
        store
            .set_item(
                "pomodoros",
                r#"{"2024-01-15": [{"anything": true}], "2024-01-14": []}"#,
            )
            .await?;
        assert_eq!(
            read_date_keys(&store, CollectionName::Pomodoros).await?,
            vec!["2024-01-14", "2024-01-15"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_mutations_keep_other_days() -> Result<()> {
        let repository = CollectionRepository::new(MemoryStore::new(), CollectionName::Notes);
        let other_day = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();

        repository.append(other_day, note(1, "yesterday")).await?;
        repository.prepend(day(), note(2, "first")).await?;
        repository.prepend(day(), note(3, "second")).await?;

        let today = repository.records(day()).await?;
        assert_eq!(today, vec![note(3, "second"), note(2, "first")]);

        let removed = repository.remove(day(), 2).await?;
        assert_eq!(removed, Some(note(2, "first")));
        assert_eq!(repository.remove(day(), 42).await?, None);

        let collection = repository.read().await?;
        assert_eq!(collection["2024-01-14"], vec![note(1, "yesterday")]);
        assert_eq!(collection["2024-01-15"], vec![note(3, "second")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_patches_only_the_matching_record() -> Result<()> {
        let repository = CollectionRepository::new(MemoryStore::new(), CollectionName::Notes);
        repository.append(day(), note(1, "one")).await?;
        repository.append(day(), note(2, "two")).await?;

        let updated = repository
            .update(day(), 2, |v| v.content = "patched".into())
            .await?;
        assert_eq!(updated, Some(note(2, "patched")));
        assert_eq!(repository.update(day(), 7, |_| ()).await?, None);

        assert_eq!(
            repository.records(day()).await?,
            vec![note(1, "one"), note(2, "patched")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_touched_day_stays_in_collection() -> Result<()> {
        let repository: CollectionRepository<_, NoteEntity> =
            CollectionRepository::new(MemoryStore::new(), CollectionName::Notes);
        repository.remove(day(), 1).await?;

        let raw = repository.store().get_item("notes").await?;
        assert_eq!(raw.as_deref(), Some(r#"{"2024-01-15":[]}"#));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_patches_every_record_with_the_id() -> Result<()> {
        let repository = CollectionRepository::new(MemoryStore::new(), CollectionName::Notes);
        repository.append(day(), note(5, "first")).await?;
        repository.append(day(), note(5, "second")).await?;
        repository.append(day(), note(6, "other")).await?;

        let updated = repository
            .update(day(), 5, |v| v.content.push('!'))
            .await?;
        assert_eq!(updated, Some(note(5, "first!")));
        assert_eq!(
            repository.records(day()).await?,
            vec![note(5, "first!"), note(5, "second!"), note(6, "other")]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_undecodable_records_survive_writes() -> Result<()> {
        let store = MemoryStore::new();
        let stored = json!({
            "2024-01-10": [
                {"id": 1, "content": 42, "createdAt": "2024-01-10T08:00:00Z"},
                {"id": 2, "content": "keep me", "createdAt": "2024-01-10T09:00:00Z"}
            ],
            "2024-01-15": [
                {"id": 3, "createdAt": "not a time"}
            ]
        });
        store.set_item("notes", &stored.to_string()).await?;
        let repository = CollectionRepository::new(&store, CollectionName::Notes);

        let other_day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let kept: Vec<NoteEntity> = repository.records(other_day).await?;
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content, "keep me");

        repository.prepend(day(), note(4, "new")).await?;

        let raw: Value = serde_json::from_str(&store.get_item("notes").await?.unwrap())?;
        assert_eq!(raw["2024-01-10"], stored["2024-01-10"]);
        assert_eq!(raw["2024-01-15"][0]["content"], "new");
        assert_eq!(raw["2024-01-15"][1], stored["2024-01-15"][0]);

        assert_eq!(repository.remove(day(), 3).await?, None);
        assert_eq!(repository.records(day()).await?, vec![note(4, "new")]);
        let raw: Value = serde_json::from_str(&store.get_item("notes").await?.unwrap())?;
        assert_eq!(raw["2024-01-15"].as_array().map(Vec::len), Some(1));
        Ok(())
    }
}
