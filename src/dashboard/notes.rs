use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{
    storage::{
        collection::{CollectionName, CollectionRepository},
        entities::{NoteEntity, RecordId},
        store::KeyValueStore,
    },
    utils::clock::Clock,
};

/// Free form notes of a day, newest first.
pub struct NotesPad<S> {
    repository: CollectionRepository<S, NoteEntity>,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> NotesPad<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository: CollectionRepository::new(store, CollectionName::Notes),
            clock,
        }
    }

    pub async fn list(&self, date: NaiveDate) -> Result<Vec<NoteEntity>> {
        self.repository.records(date).await
    }

    pub async fn add(&self, date: NaiveDate, content: &str) -> Result<Option<NoteEntity>> {
        if content.trim().is_empty() {
            debug!("Ignoring empty note");
            return Ok(None);
        }
        let now = self.clock.time();
        let note = NoteEntity {
            id: now.timestamp_millis(),
            content: content.to_owned(),
            created_at: now,
        };
        self.repository.prepend(date, note.clone()).await?;
        info!("Added note {} on {date}", note.id);
        Ok(Some(note))
    }

    pub async fn remove(&self, date: NaiveDate, id: RecordId) -> Result<Option<NoteEntity>> {
        self.repository.remove(date, id).await
    }
}
