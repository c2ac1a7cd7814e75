use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::{EngineerId, HourEntryId, ProjectId, TaskId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum HourType {
    #[default]
    Normal,
    Overtime,
}

/// A logged block of hours. Entries are created and deleted, never edited.
#[derive(Debug, Clone, PartialEq)]
pub struct HourEntry {
    pub id: HourEntryId,
    pub engineer_id: EngineerId,
    pub project_id: ProjectId,
    pub task_id: Option<TaskId>,
    pub date: Date,
    pub hours: f64,
    pub hour_type: HourType,
    pub note: Option<String>,
    pub project_name: Option<String>,
    pub task_title: Option<String>,
    pub engineer_name: Option<String>,
    pub created_at: Option<OffsetDateTime>,
}

impl HourEntry {
    pub fn new(
        id: impl Into<HourEntryId>,
        engineer_id: impl Into<EngineerId>,
        project_id: impl Into<ProjectId>,
        date: Date,
        hours: f64,
    ) -> Self {
        Self {
            id: id.into(),
            engineer_id: engineer_id.into(),
            project_id: project_id.into(),
            task_id: None,
            date,
            hours,
            hour_type: HourType::Normal,
            note: None,
            project_name: None,
            task_title: None,
            engineer_name: None,
            created_at: None,
        }
    }

    pub fn overtime(mut self) -> Self {
        self.hour_type = HourType::Overtime;
        self
    }
}

/// A validated entry ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHourEntry {
    pub engineer_id: EngineerId,
    pub project_id: ProjectId,
    pub task_id: Option<TaskId>,
    pub date: Date,
    pub hours: f64,
    pub hour_type: HourType,
    pub note: Option<String>,
}

/// An entry as submitted by a user, before the engineer is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct HourEntryRequest {
    /// Engineer to log for. Ignored for the engineer role, which always logs
    /// for itself; managers may pick any engineer and default to their own link.
    pub engineer_id: Option<EngineerId>,
    pub project_id: ProjectId,
    pub task_id: Option<TaskId>,
    pub date: Date,
    pub hours: f64,
    pub hour_type: HourType,
    pub note: Option<String>,
}
