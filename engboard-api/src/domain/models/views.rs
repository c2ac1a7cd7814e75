//! Aggregated read models returned by the services.

use std::collections::BTreeMap;

use time::Date;

use super::{EngineerId, HourEntry, Project, ProjectId, ProjectStatus, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardKpis {
    pub active_projects: usize,
    pub pending_tasks: usize,
    /// Engineers seen on the filtered project, or the whole roster unfiltered.
    pub team_size: usize,
    pub month_hours: f64,
    /// Only present for roles allowed to see costs.
    pub total_cost: Option<f64>,
}

/// One bar pair of the estimated-vs-spent chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HoursBar {
    pub project_id: ProjectId,
    pub name: String,
    pub estimated_hours: f64,
    pub spent_hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecentProject {
    pub project: Project,
    pub spent_hours: f64,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub kpis: DashboardKpis,
    pub task_status: BTreeMap<TaskStatus, usize>,
    pub hours_chart: Vec<HoursBar>,
    pub recent_projects: Vec<RecentProject>,
    /// In-progress projects offered as dashboard filter options.
    pub filter_options: Vec<Project>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectTeamRow {
    pub engineer_id: EngineerId,
    pub name: String,
    pub percent: f64,
    pub hours_logged: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOverview {
    pub project: Project,
    pub spent_hours: f64,
    pub progress: f64,
    pub total_cost: Option<f64>,
    pub done_tasks: usize,
    pub total_tasks: usize,
    pub task_status: BTreeMap<TaskStatus, usize>,
    pub hours_by_engineer: Vec<(String, f64)>,
    pub team: Vec<ProjectTeamRow>,
    /// Five most recently updated tasks.
    pub recent_tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoursHistory {
    /// Latest entries, newest first.
    pub entries: Vec<HourEntry>,
    /// Hours the caller's own engineer logged today.
    pub today_total: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilter {
    /// Defaults to the first day of the current month.
    pub from: Option<Date>,
    /// Defaults to the last day of the current month.
    pub to: Option<Date>,
    pub project_id: Option<ProjectId>,
    /// Ignored for the engineer role.
    pub engineer_id: Option<EngineerId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HoursReport {
    pub from: Date,
    pub to: Date,
    /// Oldest first.
    pub rows: Vec<HourEntry>,
    pub total_hours: f64,
}

impl ProjectStatus {
    /// Statuses shown in the dashboard hours chart when no project is selected.
    pub fn is_chartable(self) -> bool {
        matches!(self, Self::InProgress | Self::Planning)
    }
}
