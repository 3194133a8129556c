//! Per-day controllers over the local store. Every controller owns one collection and rewrites
//! it as a whole after each action, see [crate::storage].

pub mod dates;
pub mod kanban;
pub mod notes;
pub mod theme;
pub mod todo;

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use dates::{collect_date_options, DateOption};
use kanban::{KanbanBoard, KanbanColumn};
use notes::NotesPad;
use theme::ThemePreference;
use todo::TodoList;
use tracing::{info, warn};

use crate::{
    storage::{
        entities::{NoteEntity, TaskEntity},
        store::KeyValueStore,
    },
    utils::clock::Clock,
};

/// Asks the user to approve a destructive action.
#[cfg_attr(test, mockall::automock)]
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> Result<bool>;
}

/// Everything recorded for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub tasks: Vec<TaskEntity>,
    pub columns: Vec<KanbanColumn>,
    pub notes: Vec<NoteEntity>,
}

/// Wires every controller to one shared store and clock.
pub struct Dashboard<S> {
    store: S,
    clock: Arc<dyn Clock>,
    pub todo: TodoList<S>,
    pub kanban: KanbanBoard<S>,
    pub notes: NotesPad<S>,
    pub theme: ThemePreference<S>,
}

impl<S: KeyValueStore + Clone> Dashboard<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            todo: TodoList::new(store.clone(), clock.clone()),
            kanban: KanbanBoard::new(store.clone(), clock.clone()),
            notes: NotesPad::new(store.clone(), clock.clone()),
            theme: ThemePreference::new(store.clone()),
            store,
            clock,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn dates(&self) -> Result<Vec<DateOption>> {
        collect_date_options(&self.store, self.today()).await
    }

    pub async fn summary(&self, date: NaiveDate) -> Result<DaySummary> {
        Ok(DaySummary {
            date,
            tasks: self.todo.list(date).await?,
            columns: self.kanban.columns(date).await?,
            notes: self.notes.list(date).await?,
        })
    }

    /// Wipes the whole store once the user agrees. Returns whether anything was cleared.
    pub async fn clear_all_data(&self, confirm: &mut dyn Confirm) -> Result<bool> {
        let approved = confirm.confirm(
            "This removes every task, project, note and preference. It can't be undone. Continue?",
        )?;
        if !approved {
            info!("Clearing data was cancelled");
            return Ok(false);
        }
        warn!("Clearing all stored data");
        self.store.clear().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::{
        storage::{
            entities::ProjectStatus,
            store::{KeyValueStore, MemoryStore},
        },
        utils::clock::FixedClock,
    };

    use super::{
        theme::Theme,
        todo::{DurationDraft, TaskDraft},
        Dashboard, MockConfirm,
    };

    fn dashboard() -> Dashboard<Arc<MemoryStore>> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap());
        Dashboard::new(Arc::new(MemoryStore::new()), Arc::new(clock))
    }

    #[tokio::test]
    async fn test_dates_follow_recorded_days() -> Result<()> {
        let dashboard = dashboard();
        let dates = dashboard.dates().await?;
        assert_eq!(dates.len(), 1);
        assert!(dates[0].is_today);

        let earlier = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        dashboard.notes.add(earlier, "old thought").await?;
        dashboard.kanban.add(earlier, "old project").await?;

        let dates = dashboard.dates().await?;
        assert_eq!(
            dates.iter().map(|v| v.key.as_str()).collect::<Vec<_>>(),
            vec!["2024-01-10"]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_collects_every_feature() -> Result<()> {
        let dashboard = dashboard();
        let today = dashboard.today();
        dashboard
            .todo
            .add(
                today,
                &TaskDraft {
                    title: "Write report".into(),
                    duration: DurationDraft::from_minutes(60).unwrap(),
                },
            )
            .await?;
        dashboard.kanban.add(today, "Launch").await?;
        dashboard.notes.add(today, "Remember milk").await?;

        let summary = dashboard.summary(today).await?;
        assert_eq!(summary.tasks.len(), 1);
        assert_eq!(summary.columns[0].status, ProjectStatus::Todo);
        assert_eq!(summary.columns[0].projects.len(), 1);
        assert_eq!(summary.notes[0].content, "Remember milk");
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_requires_confirmation() -> Result<()> {
        let dashboard = dashboard();
        dashboard.notes.add(dashboard.today(), "keep me").await?;
        dashboard.theme.set(Theme::Dark).await?;

        let mut refuse = MockConfirm::new();
        refuse.expect_confirm().times(1).returning(|_| Ok(false));
        assert!(!dashboard.clear_all_data(&mut refuse).await?);
        assert_eq!(dashboard.store.keys().await?, vec!["notes", "theme"]);

        let mut accept = MockConfirm::new();
        accept.expect_confirm().times(1).returning(|_| Ok(true));
        assert!(dashboard.clear_all_data(&mut accept).await?);
        assert!(dashboard.store.keys().await?.is_empty());
        assert_eq!(dashboard.theme.get().await?, Theme::Light);
        Ok(())
    }
}
