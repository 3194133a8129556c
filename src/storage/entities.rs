use std::fmt::Display;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Records are identified by the millisecond they were created at.
pub type RecordId = i64;

/// Anything stored inside a date keyed collection.
pub trait DatedRecord {
    fn id(&self) -> RecordId;
}

/// An entry of the to-do list.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntity {
    pub id: RecordId,
    pub title: String,
    /// Planned duration. Always a multiple of 30 when created through [crate::dashboard::todo].
    pub duration_minutes: u32,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskEntity {
    /// Time it actually took, measured from creation to completion. Never negative.
    pub fn actual_duration(&self) -> Option<Duration> {
        self.completed_at
            .map(|completed_at| (completed_at - self.created_at).max(Duration::zero()))
    }

    pub fn actual_minutes(&self) -> Option<i64> {
        self.actual_duration().map(|v| v.num_minutes())
    }
}

impl DatedRecord for TaskEntity {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Todo,
    #[serde(rename = "inprogress")]
    InProgress,
    Done,
}

impl ProjectStatus {
    /// Kanban columns in display order.
    pub const ALL: [ProjectStatus; 3] = [Self::Todo, Self::InProgress, Self::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow!("Unknown project status {s}. Expected todo, inprogress or done"))
    }
}

/// A card on the kanban board.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntity {
    pub id: RecordId,
    pub title: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
}

impl DatedRecord for ProjectEntity {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntity {
    pub id: RecordId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl DatedRecord for NoteEntity {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::{ProjectEntity, ProjectStatus, TaskEntity};

    #[test]
    fn test_task_uses_camel_case_fields() {
        let json = r#"{
            "id": 1705312800000,
            "title": "Write report",
            "durationMinutes": 60,
            "completed": false,
            "createdAt": "2024-01-15T10:00:00.000Z",
            "completedAt": null
        }"#;
        let task: TaskEntity = serde_json::from_str(json).unwrap();
        assert_eq!(task.duration_minutes, 60);
        assert_eq!(
            task.created_at,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
        );
        assert_eq!(task.completed_at, None);

        let value = serde_json::to_value(&task).unwrap();
        assert!(value.get("durationMinutes").is_some());
        assert!(value.get("completedAt").unwrap().is_null());
    }

    #[test]
    fn test_actual_duration_is_never_negative() {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut task = TaskEntity {
            id: 1,
            title: "t".into(),
            duration_minutes: 30,
            completed: true,
            created_at,
            completed_at: Some(created_at + Duration::seconds(95 * 60 + 59)),
        };
        assert_eq!(task.actual_minutes(), Some(95));

        task.completed_at = Some(created_at - Duration::minutes(5));
        assert_eq!(task.actual_minutes(), Some(0));

        task.completed_at = None;
        assert_eq!(task.actual_minutes(), None);
    }

    #[test]
    fn test_project_status_wire_format() {
        let project = ProjectEntity {
            id: 1,
            title: "Launch".into(),
            status: ProjectStatus::InProgress,
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
        };
        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["status"], "inprogress");

        assert_eq!("Done".parse::<ProjectStatus>().unwrap(), ProjectStatus::Done);
        assert!("archived".parse::<ProjectStatus>().is_err());
    }
}
