//! HTTP response types.
//!
//! These types serialize to the camelCase JSON format expected by the frontend.
//! Dates are plain `YYYY-MM-DD` strings.

use serde::Serialize;

use crate::domain::{
    aggregation::{EngineerUtilization, TeamMember, UtilizationLevel, UtilizationOverview},
    board::{BoardCard, BoardColumn, BoardView},
    models::{
        Allocation, Client, Dashboard, DashboardKpis, Engineer, HourEntry, HourType, HoursBar,
        HoursHistory, HoursReport, Profile, Project, ProjectOverview, ProjectStatus,
        ProjectTeamRow, RecentProject, Role, Task, TaskStatus,
    },
    SessionContext,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub engineer_id: Option<String>,
    pub can_view_costs: bool,
}

impl From<&SessionContext> for ProfileResponse {
    fn from(session: &SessionContext) -> Self {
        let Profile {
            id,
            name,
            email,
            role,
        } = session.profile().clone();
        Self {
            id: id.to_string(),
            name,
            email,
            role,
            engineer_id: session.engineer_id().map(|id| id.to_string()),
            can_view_costs: session.can_view_costs(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub profile: ProfileResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    pub id: String,
    pub name: String,
    pub tax_id: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
}

impl From<Client> for ClientResponse {
    fn from(client: Client) -> Self {
        Self {
            id: client.id.to_string(),
            name: client.name,
            tax_id: client.tax_id,
            contact: client.contact,
            email: client.email,
        }
    }
}

/// Engineer row. Rates are only present for roles allowed to see costs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerResponse {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub specialty: Option<String>,
    pub level: Option<String>,
    pub availability: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normal_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overtime_rate: Option<f64>,
    pub linked: bool,
}

impl EngineerResponse {
    pub fn new(engineer: Engineer, show_costs: bool) -> Self {
        Self {
            id: engineer.id.to_string(),
            name: engineer.name,
            email: engineer.email,
            specialty: engineer.specialty,
            level: engineer.level,
            availability: engineer.availability,
            normal_rate: show_costs.then_some(engineer.normal_rate),
            overtime_rate: show_costs.then_some(engineer.overtime_rate),
            linked: engineer.user_id.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    pub name: String,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub status: ProjectStatus,
    pub estimated_hours: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id.to_string(),
            name: project.name,
            client_id: project.client_id.map(|id| id.to_string()),
            client_name: project.client_name,
            status: project.status,
            estimated_hours: project.estimated_hours,
            start_date: project.start_date.map(|d| d.to_string()),
            end_date: project.end_date.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub project_id: String,
    pub project_name: Option<String>,
    pub engineer_id: Option<String>,
    pub engineer_name: Option<String>,
    pub status: TaskStatus,
    pub estimated_hours: f64,
    pub deadline: Option<String>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title,
            description: task.description,
            project_id: task.project_id.to_string(),
            project_name: task.project_name,
            engineer_id: task.engineer_id.map(|id| id.to_string()),
            engineer_name: task.engineer_name,
            status: task.status,
            estimated_hours: task.estimated_hours,
            deadline: task.deadline.map(|d| d.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardCardResponse {
    #[serde(flatten)]
    pub task: TaskResponse,
    /// A move of this card is waiting for the store.
    pub pending: bool,
}

impl From<BoardCard> for BoardCardResponse {
    fn from(card: BoardCard) -> Self {
        Self {
            task: card.task.into(),
            pending: card.pending,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumnResponse {
    pub status: TaskStatus,
    pub count: usize,
    pub cards: Vec<BoardCardResponse>,
}

impl From<BoardColumn> for BoardColumnResponse {
    fn from(column: BoardColumn) -> Self {
        Self {
            status: column.status,
            count: column.count(),
            cards: column.cards.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
    pub columns: Vec<BoardColumnResponse>,
    pub revision: u64,
}

impl From<BoardView> for BoardResponse {
    fn from(view: BoardView) -> Self {
        Self {
            columns: view.columns.into_iter().map(Into::into).collect(),
            revision: view.revision,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourEntryResponse {
    pub id: String,
    pub engineer_id: String,
    pub engineer_name: Option<String>,
    pub project_id: String,
    pub project_name: Option<String>,
    pub task_id: Option<String>,
    pub task_title: Option<String>,
    pub date: String,
    pub hours: f64,
    pub hour_type: HourType,
    pub note: Option<String>,
}

impl From<HourEntry> for HourEntryResponse {
    fn from(entry: HourEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            engineer_id: entry.engineer_id.to_string(),
            engineer_name: entry.engineer_name,
            project_id: entry.project_id.to_string(),
            project_name: entry.project_name,
            task_id: entry.task_id.map(|id| id.to_string()),
            task_title: entry.task_title,
            date: entry.date.to_string(),
            hours: entry.hours,
            hour_type: entry.hour_type,
            note: entry.note,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursHistoryResponse {
    pub entries: Vec<HourEntryResponse>,
    pub today_total: f64,
}

impl From<HoursHistory> for HoursHistoryResponse {
    fn from(history: HoursHistory) -> Self {
        Self {
            entries: history.entries.into_iter().map(Into::into).collect(),
            today_total: history.today_total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursReportResponse {
    pub from: String,
    pub to: String,
    pub rows: Vec<HourEntryResponse>,
    pub total_hours: f64,
}

impl From<HoursReport> for HoursReportResponse {
    fn from(report: HoursReport) -> Self {
        Self {
            from: report.from.to_string(),
            to: report.to.to_string(),
            rows: report.rows.into_iter().map(Into::into).collect(),
            total_hours: report.total_hours,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpisResponse {
    pub active_projects: usize,
    pub pending_tasks: usize,
    pub team_size: usize,
    pub month_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl From<DashboardKpis> for KpisResponse {
    fn from(kpis: DashboardKpis) -> Self {
        Self {
            active_projects: kpis.active_projects,
            pending_tasks: kpis.pending_tasks,
            team_size: kpis.team_size,
            month_hours: kpis.month_hours,
            total_cost: kpis.total_cost,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCountResponse {
    pub status: TaskStatus,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursBarResponse {
    pub project_id: String,
    pub name: String,
    pub estimated_hours: f64,
    pub spent_hours: f64,
}

impl From<HoursBar> for HoursBarResponse {
    fn from(bar: HoursBar) -> Self {
        Self {
            project_id: bar.project_id.to_string(),
            name: bar.name,
            estimated_hours: bar.estimated_hours,
            spent_hours: bar.spent_hours,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentProjectResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub spent_hours: f64,
    pub progress: f64,
}

impl From<RecentProject> for RecentProjectResponse {
    fn from(recent: RecentProject) -> Self {
        Self {
            project: recent.project.into(),
            spent_hours: recent.spent_hours,
            progress: recent.progress,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub kpis: KpisResponse,
    pub task_status: Vec<StatusCountResponse>,
    pub hours_chart: Vec<HoursBarResponse>,
    pub recent_projects: Vec<RecentProjectResponse>,
    pub filter_options: Vec<ProjectResponse>,
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        Self {
            kpis: dashboard.kpis.into(),
            task_status: dashboard
                .task_status
                .into_iter()
                .map(|(status, count)| StatusCountResponse { status, count })
                .collect(),
            hours_chart: dashboard.hours_chart.into_iter().map(Into::into).collect(),
            recent_projects: dashboard
                .recent_projects
                .into_iter()
                .map(Into::into)
                .collect(),
            filter_options: dashboard.filter_options.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerUtilizationResponse {
    pub engineer_id: String,
    pub name: String,
    pub specialty: Option<String>,
    pub utilization: f64,
    pub level: UtilizationLevel,
    pub active_projects: Vec<String>,
}

impl From<EngineerUtilization> for EngineerUtilizationResponse {
    fn from(row: EngineerUtilization) -> Self {
        Self {
            engineer_id: row.engineer_id.to_string(),
            name: row.name,
            specialty: row.specialty,
            utilization: row.utilization,
            level: row.level,
            active_projects: row.active_projects,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationOverviewResponse {
    pub engineers: Vec<EngineerUtilizationResponse>,
    pub fleet_utilization: f64,
    pub overloaded_count: usize,
}

impl From<UtilizationOverview> for AllocationOverviewResponse {
    fn from(overview: UtilizationOverview) -> Self {
        Self {
            engineers: overview.engineers.into_iter().map(Into::into).collect(),
            fleet_utilization: overview.fleet_utilization,
            overloaded_count: overview.overloaded_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRowResponse {
    pub engineer_id: String,
    pub name: String,
    pub percent: f64,
    pub hours_logged: f64,
}

impl From<ProjectTeamRow> for TeamRowResponse {
    fn from(row: ProjectTeamRow) -> Self {
        Self {
            engineer_id: row.engineer_id.to_string(),
            name: row.name,
            percent: row.percent,
            hours_logged: row.hours_logged,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineerHoursResponse {
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverviewResponse {
    pub project: ProjectResponse,
    pub spent_hours: f64,
    pub progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
    pub done_tasks: usize,
    pub total_tasks: usize,
    pub task_status: Vec<StatusCountResponse>,
    pub hours_by_engineer: Vec<EngineerHoursResponse>,
    pub team: Vec<TeamRowResponse>,
    pub recent_tasks: Vec<TaskResponse>,
}

impl From<ProjectOverview> for ProjectOverviewResponse {
    fn from(overview: ProjectOverview) -> Self {
        Self {
            project: overview.project.into(),
            spent_hours: overview.spent_hours,
            progress: overview.progress,
            total_cost: overview.total_cost,
            done_tasks: overview.done_tasks,
            total_tasks: overview.total_tasks,
            task_status: overview
                .task_status
                .into_iter()
                .map(|(status, count)| StatusCountResponse { status, count })
                .collect(),
            hours_by_engineer: overview
                .hours_by_engineer
                .into_iter()
                .map(|(name, hours)| EngineerHoursResponse { name, hours })
                .collect(),
            team: overview.team.into_iter().map(Into::into).collect(),
            recent_tasks: overview.recent_tasks.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberResponse {
    pub allocation_id: String,
    pub engineer_id: String,
    pub name: Option<String>,
    pub percent: f64,
    pub allocated_hours: f64,
}

impl From<TeamMember> for TeamMemberResponse {
    fn from(member: TeamMember) -> Self {
        Self {
            allocation_id: member.allocation_id.to_string(),
            engineer_id: member.engineer_id.to_string(),
            name: member.name,
            percent: member.percent,
            allocated_hours: member.allocated_hours,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub id: String,
    pub engineer_id: String,
    pub engineer_name: Option<String>,
    pub project_id: String,
    pub percent: f64,
}

impl From<Allocation> for AllocationResponse {
    fn from(allocation: Allocation) -> Self {
        Self {
            id: allocation.id.to_string(),
            engineer_id: allocation.engineer_id.to_string(),
            engineer_name: allocation.engineer_name,
            project_id: allocation.project_id.to_string(),
            percent: allocation.percent,
        }
    }
}
