use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::{EngineerId, ProjectId, TaskId};

/// Board column of a task, in left-to-right order.
///
/// Any status may move to any other status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Backlog,
    Todo,
    Doing,
    Review,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        Self::Backlog,
        Self::Todo,
        Self::Doing,
        Self::Review,
        Self::Done,
    ];

    /// Statuses counted as "pending" on the dashboard.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::Backlog | Self::Todo | Self::Doing)
    }

    /// Statuses a task must be in to receive logged hours.
    pub fn accepts_hours(self) -> bool {
        matches!(self, Self::Todo | Self::Doing | Self::Review)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub engineer_id: Option<EngineerId>,
    pub status: TaskStatus,
    pub estimated_hours: f64,
    pub deadline: Option<Date>,
    pub project_name: Option<String>,
    pub engineer_name: Option<String>,
    pub updated_at: Option<OffsetDateTime>,
}

impl Task {
    pub fn new(
        id: impl Into<TaskId>,
        title: impl Into<String>,
        project_id: impl Into<ProjectId>,
        status: TaskStatus,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            project_id: project_id.into(),
            engineer_id: None,
            status,
            estimated_hours: 0.0,
            deadline: None,
            project_name: None,
            engineer_name: None,
            updated_at: None,
        }
    }

    pub fn with_engineer(mut self, engineer_id: impl Into<EngineerId>) -> Self {
        self.engineer_id = Some(engineer_id.into());
        self
    }
}

/// Writable fields of a task.
///
/// There is deliberately no status here: new tasks always start in the
/// backlog and edits keep whatever status the task already has. Status only
/// changes through a board move.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub project_id: ProjectId,
    pub engineer_id: Option<EngineerId>,
    pub estimated_hours: f64,
    pub deadline: Option<Date>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, project_id: impl Into<ProjectId>) -> Self {
        Self {
            title: title.into(),
            description: None,
            project_id: project_id.into(),
            engineer_id: None,
            estimated_hours: 0.0,
            deadline: None,
        }
    }

    pub fn with_engineer(mut self, engineer_id: impl Into<EngineerId>) -> Self {
        self.engineer_id = Some(engineer_id.into());
        self
    }
}
