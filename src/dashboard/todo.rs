use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{
    storage::{
        collection::{CollectionName, CollectionRepository},
        entities::{RecordId, TaskEntity},
        store::KeyValueStore,
    },
    utils::clock::Clock,
};

/// Planned duration of a task being drafted. Moves in half hour steps and never drops below 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DurationDraft {
    minutes: u32,
}

impl DurationDraft {
    pub const STEP_MINUTES: u32 = 30;

    /// Returns `None` unless `minutes` is a multiple of [Self::STEP_MINUTES].
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes % Self::STEP_MINUTES == 0).then_some(Self { minutes })
    }

    pub fn increase(&mut self) {
        self.minutes = self.minutes.saturating_add(Self::STEP_MINUTES);
    }

    pub fn decrease(&mut self) {
        self.minutes = self.minutes.saturating_sub(Self::STEP_MINUTES);
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn is_zero(&self) -> bool {
        self.minutes == 0
    }
}

/// Direction of a single [DurationDraft] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationStep {
    Increase,
    Decrease,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub duration: DurationDraft,
}

/// The to-do list of a day. Newest tasks come first.
pub struct TodoList<S> {
    repository: CollectionRepository<S, TaskEntity>,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> TodoList<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository: CollectionRepository::new(store, CollectionName::Tasks),
            clock,
        }
    }

    pub async fn list(&self, date: NaiveDate) -> Result<Vec<TaskEntity>> {
        self.repository.records(date).await
    }

    /// Adds a task on top of the list. Blank titles and zero durations are ignored without
    /// touching storage.
    pub async fn add(&self, date: NaiveDate, draft: &TaskDraft) -> Result<Option<TaskEntity>> {
        if draft.title.trim().is_empty() || draft.duration.is_zero() {
            debug!("Ignoring incomplete task draft {draft:?}");
            return Ok(None);
        }

        let now = self.clock.time();
        let task = TaskEntity {
            id: now.timestamp_millis(),
            title: draft.title.clone(),
            duration_minutes: draft.duration.minutes(),
            completed: false,
            created_at: now,
            completed_at: None,
        };
        self.repository.prepend(date, task.clone()).await?;
        info!("Added task {} on {date}", task.id);
        Ok(Some(task))
    }

    /// Flips completion. Completing stamps the current time, reopening clears it.
    pub async fn toggle(&self, date: NaiveDate, id: RecordId) -> Result<Option<TaskEntity>> {
        let now = self.clock.time();
        let task = self
            .repository
            .update(date, id, |task| {
                task.completed = !task.completed;
                task.completed_at = task.completed.then_some(now);
            })
            .await?;
        debug!("Toggled task {id} on {date}: {task:?}");
        Ok(task)
    }

    /// Moves the planned duration of a stored task one step up or down.
    pub async fn adjust_duration(
        &self,
        date: NaiveDate,
        id: RecordId,
        step: DurationStep,
    ) -> Result<Option<TaskEntity>> {
        let task = self
            .repository
            .update(date, id, |task| {
                let mut duration = DurationDraft {
                    minutes: task.duration_minutes,
                };
                match step {
                    DurationStep::Increase => duration.increase(),
                    DurationStep::Decrease => duration.decrease(),
                }
                task.duration_minutes = duration.minutes();
            })
            .await?;
        debug!("Adjusted duration of task {id} on {date}: {task:?}");
        Ok(task)
    }

    pub async fn remove(&self, date: NaiveDate, id: RecordId) -> Result<Option<TaskEntity>> {
        self.repository.remove(date, id).await
    }
}
