use super::{AllocationId, EngineerId, ProjectId};

/// Share of an engineer's time assigned to a project.
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub id: AllocationId,
    pub engineer_id: EngineerId,
    pub project_id: ProjectId,
    /// Percentage of full time. May be missing or malformed in stored rows;
    /// aggregation treats anything non-finite or negative as 0.
    pub percent: f64,
    pub engineer_name: Option<String>,
}

impl Allocation {
    pub fn new(
        id: impl Into<AllocationId>,
        engineer_id: impl Into<EngineerId>,
        project_id: impl Into<ProjectId>,
        percent: f64,
    ) -> Self {
        Self {
            id: id.into(),
            engineer_id: engineer_id.into(),
            project_id: project_id.into(),
            percent,
            engineer_name: None,
        }
    }

    pub fn with_engineer_name(mut self, name: impl Into<String>) -> Self {
        self.engineer_name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationInput {
    pub engineer_id: EngineerId,
    pub project_id: ProjectId,
    pub percent: f64,
}
