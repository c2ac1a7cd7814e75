use time::Date;

use super::{EngineerId, ProjectId};

/// Row filter shared by task, hour entry and allocation listings.
///
/// Fields that do not apply to a given table are ignored (tasks and
/// allocations have no date column).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub project_id: Option<ProjectId>,
    pub engineer_id: Option<EngineerId>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub limit: Option<usize>,
}

impl RecordFilter {
    pub fn for_project(project_id: impl Into<ProjectId>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Default::default()
        }
    }

    pub fn for_engineer(engineer_id: impl Into<EngineerId>) -> Self {
        Self {
            engineer_id: Some(engineer_id.into()),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project_id: Option<ProjectId>) -> Self {
        self.project_id = project_id;
        self
    }

    pub fn with_engineer(mut self, engineer_id: Option<EngineerId>) -> Self {
        self.engineer_id = engineer_id;
        self
    }

    pub fn between(mut self, from: Option<Date>, to: Option<Date>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches_project(&self, project_id: &ProjectId) -> bool {
        self.project_id.as_ref().map_or(true, |id| id == project_id)
    }

    pub fn matches_engineer(&self, engineer_id: Option<&EngineerId>) -> bool {
        match &self.engineer_id {
            Some(wanted) => engineer_id == Some(wanted),
            None => true,
        }
    }

    pub fn matches_date(&self, date: Date) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}
