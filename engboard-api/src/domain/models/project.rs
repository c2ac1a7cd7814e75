use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use super::{ClientId, ProjectId};

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Completed,
    Paused,
    Cancelled,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        Self::Planning,
        Self::InProgress,
        Self::Completed,
        Self::Paused,
        Self::Cancelled,
    ];

    /// Only in-progress projects count toward utilization.
    pub fn is_active(self) -> bool {
        self == Self::InProgress
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub client_id: Option<ClientId>,
    /// Embedded client name, when fetched with the client relation.
    pub client_name: Option<String>,
    pub status: ProjectStatus,
    pub estimated_hours: f64,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub created_at: Option<OffsetDateTime>,
}

impl Project {
    pub fn new(id: impl Into<ProjectId>, name: impl Into<String>, status: ProjectStatus) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            client_id: None,
            client_name: None,
            status,
            estimated_hours: 0.0,
            start_date: None,
            end_date: None,
            created_at: None,
        }
    }

    pub fn with_estimated_hours(mut self, hours: f64) -> Self {
        self.estimated_hours = hours;
        self
    }

    pub fn with_client(mut self, id: impl Into<ClientId>, name: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self.client_name = Some(name.into());
        self
    }

    pub fn with_created_at(mut self, created_at: OffsetDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

/// Writable fields of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectInput {
    pub name: String,
    pub client_id: Option<ClientId>,
    pub status: ProjectStatus,
    pub estimated_hours: f64,
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
}

/// Filter for project listings. Results are ordered newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectFilter {
    /// Restrict to these ids. `Some(vec![])` matches nothing.
    pub ids: Option<Vec<ProjectId>>,
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn with_ids(mut self, ids: Vec<ProjectId>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, project: &Project) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&project.id) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if project.status != status {
                return false;
            }
        }
        true
    }
}
