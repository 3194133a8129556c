use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::{
    storage::{
        collection::{CollectionName, CollectionRepository},
        entities::{ProjectEntity, ProjectStatus, RecordId},
        store::KeyValueStore,
    },
    utils::clock::Clock,
};

/// Projects of one status, in the order they were stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KanbanColumn {
    pub status: ProjectStatus,
    pub projects: Vec<ProjectEntity>,
}

/// Splits projects into the three fixed columns.
pub fn group_into_columns(projects: Vec<ProjectEntity>) -> Vec<KanbanColumn> {
    let mut columns = ProjectStatus::ALL
        .map(|status| KanbanColumn {
            status,
            projects: vec![],
        })
        .to_vec();
    for project in projects {
        if let Some(column) = columns.iter_mut().find(|v| v.status == project.status) {
            column.projects.push(project);
        }
    }
    columns
}

pub struct KanbanBoard<S> {
    repository: CollectionRepository<S, ProjectEntity>,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> KanbanBoard<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository: CollectionRepository::new(store, CollectionName::Projects),
            clock,
        }
    }

    pub async fn list(&self, date: NaiveDate) -> Result<Vec<ProjectEntity>> {
        self.repository.records(date).await
    }

    pub async fn columns(&self, date: NaiveDate) -> Result<Vec<KanbanColumn>> {
        Ok(group_into_columns(self.list(date).await?))
    }

    /// New projects land at the end of the board in the `todo` column. Blank titles are ignored.
    pub async fn add(&self, date: NaiveDate, title: &str) -> Result<Option<ProjectEntity>> {
        if title.trim().is_empty() {
            debug!("Ignoring project without a title");
            return Ok(None);
        }
        let now = self.clock.time();
        let project = ProjectEntity {
            id: now.timestamp_millis(),
            title: title.to_owned(),
            status: ProjectStatus::Todo,
            created_at: now,
        };
        self.repository.append(date, project.clone()).await?;
        info!("Added project {} on {date}", project.id);
        Ok(Some(project))
    }

    /// Only the status changes, everything else about the project stays.
    pub async fn move_project(
        &self,
        date: NaiveDate,
        id: RecordId,
        status: ProjectStatus,
    ) -> Result<Option<ProjectEntity>> {
        let project = self
            .repository
            .update(date, id, |project| project.status = status)
            .await?;
        debug!("Moved project {id} on {date} to {status}");
        Ok(project)
    }

    pub async fn remove(&self, date: NaiveDate, id: RecordId) -> Result<Option<ProjectEntity>> {
        self.repository.remove(date, id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    use crate::{
        storage::{
            entities::{ProjectEntity, ProjectStatus},
            store::MemoryStore,
        },
        utils::clock::FixedClock,
    };

    use super::{group_into_columns, KanbanBoard};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn board_at(store: Arc<MemoryStore>, minute: i64) -> KanbanBoard<Arc<MemoryStore>> {
        let time = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap() + Duration::minutes(minute);
        KanbanBoard::new(store, Arc::new(FixedClock(time)))
    }

    #[tokio::test]
    async fn test_projects_are_appended_as_todo() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        board_at(store.clone(), 0).add(day(), "first").await?;
        board_at(store.clone(), 1).add(day(), "second").await?;
        assert_eq!(board_at(store.clone(), 2).add(day(), "").await?, None);

        let projects = board_at(store, 3).list(day()).await?;
        assert_eq!(
            projects.iter().map(|v| v.title.as_str()).collect::<Vec<_>>(),
            vec!["first", "second"]
        );
        assert!(projects.iter().all(|v| v.status == ProjectStatus::Todo));
        Ok(())
    }

    #[tokio::test]
    async fn test_move_changes_only_status() -> Result<()> {
        let board = board_at(Arc::new(MemoryStore::new()), 0);
        let project = board.add(day(), "Launch").await?.unwrap();

        let moved = board
            .move_project(day(), project.id, ProjectStatus::InProgress)
            .await?
            .unwrap();
        assert_eq!(
            moved,
            ProjectEntity {
                status: ProjectStatus::InProgress,
                ..project.clone()
            }
        );
        assert_eq!(board.list(day()).await?, vec![moved]);

        assert_eq!(
            board.move_project(day(), project.id + 1, ProjectStatus::Done).await?,
            None
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_project() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        let keep = board_at(store.clone(), 0).add(day(), "keep").await?.unwrap();
        let dropped = board_at(store.clone(), 1).add(day(), "drop").await?.unwrap();

        let board = board_at(store, 2);
        assert_eq!(board.remove(day(), dropped.id).await?, Some(dropped));
        assert_eq!(board.list(day()).await?, vec![keep]);
        Ok(())
    }

    #[test]
    fn test_columns_keep_stored_order() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
        let project = |id, status| ProjectEntity {
            id,
            title: format!("p{id}"),
            status,
            created_at,
        };
        let columns = group_into_columns(vec![
            project(1, ProjectStatus::Done),
            project(2, ProjectStatus::Todo),
            project(3, ProjectStatus::Done),
        ]);

        assert_eq!(
            columns.iter().map(|v| v.status).collect::<Vec<_>>(),
            ProjectStatus::ALL.to_vec()
        );
        assert_eq!(columns[0].projects, vec![project(2, ProjectStatus::Todo)]);
        assert!(columns[1].projects.is_empty());
        assert_eq!(
            columns[2].projects.iter().map(|v| v.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }
}
