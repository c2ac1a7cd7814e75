use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{
    aggregation::{self, UtilizationOverview},
    models::{
        Dashboard, DashboardKpis, HoursBar, ProjectFilter, ProjectId, ProjectOverview,
        ProjectStatus, ProjectTeamRow, RecentProject, RecordFilter, TaskStatus,
    },
    ports::{
        inbound::DashboardService,
        outbound::{AllocationStore, EngineerStore, EntryOrder, HourEntryStore, ProjectStore, TaskStore},
    },
    services::project_scope,
    Clock, DashboardError, SessionContext,
};

const CHART_PROJECTS: usize = 7;
const RECENT_PROJECTS: usize = 5;
const RECENT_TASKS: usize = 5;

/// Implementation of the DashboardService inbound port.
///
/// Fetches the rows each view needs concurrently and hands them to the pure
/// aggregation functions.
pub struct DashboardServiceImpl<S> {
    store: Arc<S>,
    clock: Clock,
}

impl<S> DashboardServiceImpl<S>
where
    S: ProjectStore + TaskStore + HourEntryStore + EngineerStore + AllocationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            clock: Clock::System,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait]
impl<S> DashboardService for DashboardServiceImpl<S>
where
    S: ProjectStore + TaskStore + HourEntryStore + EngineerStore + AllocationStore,
{
    #[instrument(skip(self))]
    async fn dashboard(
        &self,
        session: &SessionContext,
        project_id: Option<&ProjectId>,
    ) -> Result<Dashboard, DashboardError> {
        let scope = session.scope(RecordFilter::default())?;
        let project_filter = project_scope(self.store.as_ref(), &scope).await?;
        let narrowed = scope.with_project(project_id.cloned());

        let (visible_projects, tasks, hours, engineers) = tokio::try_join!(
            self.store.list_projects(&project_filter),
            self.store.list_tasks(&narrowed),
            self.store.list_hour_entries(&narrowed, EntryOrder::Latest),
            self.store.list_engineers(),
        )?;

        let projects: Vec<_> = match project_id {
            Some(id) => visible_projects
                .iter()
                .filter(|p| &p.id == id)
                .cloned()
                .collect(),
            None => visible_projects.clone(),
        };

        let team_size = if project_id.is_some() {
            tasks
                .iter()
                .filter_map(|t| t.engineer_id.as_ref())
                .chain(hours.iter().map(|h| &h.engineer_id))
                .collect::<HashSet<_>>()
                .len()
        } else {
            engineers.len()
        };

        let kpis = DashboardKpis {
            active_projects: projects
                .iter()
                .filter(|p| p.status == ProjectStatus::InProgress)
                .count(),
            pending_tasks: tasks.iter().filter(|t| t.status.is_pending()).count(),
            team_size,
            month_hours: aggregation::month_total(&hours, self.clock.today()),
            total_cost: session
                .can_view_costs()
                .then(|| aggregation::cost_total(&hours, &engineers)),
        };

        let spent = aggregation::spent_by_project(&hours);
        let spent_on = |id: &ProjectId| spent.get(id).copied().unwrap_or(0.0);

        let chart_projects: Vec<_> = if project_id.is_some() {
            projects.iter().take(1).collect()
        } else {
            let chartable: Vec<_> = projects
                .iter()
                .filter(|p| p.status.is_chartable())
                .take(CHART_PROJECTS)
                .collect();
            if chartable.is_empty() {
                projects.iter().take(CHART_PROJECTS).collect()
            } else {
                chartable
            }
        };
        let hours_chart = chart_projects
            .into_iter()
            .map(|p| HoursBar {
                project_id: p.id.clone(),
                name: p.name.clone(),
                estimated_hours: aggregation::sanitize(p.estimated_hours),
                spent_hours: spent_on(&p.id),
            })
            .collect();

        let recent_projects = projects
            .iter()
            .take(RECENT_PROJECTS)
            .map(|p| {
                let progress = aggregation::project_progress(p, spent_on(&p.id));
                RecentProject {
                    project: p.clone(),
                    spent_hours: progress.spent_hours,
                    progress: progress.progress,
                }
            })
            .collect();

        let filter_options = visible_projects
            .into_iter()
            .filter(|p| p.status == ProjectStatus::InProgress)
            .collect();

        Ok(Dashboard {
            kpis,
            task_status: aggregation::status_distribution(&tasks),
            hours_chart,
            recent_projects,
            filter_options,
        })
    }

    #[instrument(skip(self))]
    async fn allocation_overview(
        &self,
        session: &SessionContext,
    ) -> Result<UtilizationOverview, DashboardError> {
        session.require_privileged("the allocation overview")?;

        let every_allocation = RecordFilter::default();
        let every_project = ProjectFilter::default();
        let (engineers, allocations, projects) = tokio::try_join!(
            self.store.list_engineers(),
            self.store.list_allocations(&every_allocation),
            self.store.list_projects(&every_project),
        )?;

        Ok(aggregation::utilization_overview(
            &engineers,
            &allocations,
            &projects,
        ))
    }

    #[instrument(skip(self))]
    async fn project_overview(
        &self,
        session: &SessionContext,
        project_id: &ProjectId,
    ) -> Result<ProjectOverview, DashboardError> {
        let scope = session.scope(RecordFilter::for_project(project_id.clone()))?;
        let team_filter = RecordFilter::for_project(project_id.clone());

        let (project, tasks, hours, allocations, engineers) = tokio::try_join!(
            self.store.get_project(project_id),
            self.store.list_tasks(&scope),
            self.store.list_hour_entries(&scope, EntryOrder::Latest),
            self.store.list_allocations(&team_filter),
            self.store.list_engineers(),
        )?;
        let project = project.ok_or_else(|| DashboardError::ProjectNotFound(project_id.clone()))?;

        let spent_hours = aggregation::total_hours(&hours);
        let progress = aggregation::project_progress(&project, spent_hours).progress;

        let team = allocations
            .iter()
            .map(|a| {
                let name = a
                    .engineer_name
                    .clone()
                    .or_else(|| {
                        engineers
                            .iter()
                            .find(|e| e.id == a.engineer_id)
                            .map(|e| e.name.clone())
                    })
                    .unwrap_or_else(|| a.engineer_id.to_string());
                let hours_logged = hours
                    .iter()
                    .filter(|h| h.engineer_id == a.engineer_id)
                    .map(|h| aggregation::sanitize(h.hours))
                    .sum();
                ProjectTeamRow {
                    engineer_id: a.engineer_id.clone(),
                    name,
                    percent: aggregation::sanitize(a.percent),
                    hours_logged,
                }
            })
            .collect();

        Ok(ProjectOverview {
            spent_hours,
            progress,
            total_cost: session
                .can_view_costs()
                .then(|| aggregation::cost_total(&hours, &engineers)),
            done_tasks: tasks.iter().filter(|t| t.status == TaskStatus::Done).count(),
            total_tasks: tasks.len(),
            task_status: aggregation::status_distribution(&tasks),
            hours_by_engineer: aggregation::hours_by_engineer(&hours, &engineers),
            team,
            recent_tasks: tasks.into_iter().take(RECENT_TASKS).collect(),
            project,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::memory::InMemoryStore,
        domain::{
            models::{
                Allocation, Engineer, EngineerId, HourEntry, Profile, Project, Role, Task,
            },
            AccessError,
        },
    };
    use time::macros::date;

    const TODAY: time::Date = date!(2024 - 03 - 15);

    fn engineer(id: &str, name: &str) -> Engineer {
        Engineer {
            id: EngineerId::new(id),
            name: name.to_string(),
            email: None,
            specialty: None,
            level: None,
            normal_rate: 100.0,
            overtime_rate: 150.0,
            availability: 100.0,
            user_id: None,
        }
    }

    fn session(role: Role, engineer: Option<&str>) -> SessionContext {
        SessionContext::new(
            "token",
            Profile::new("u1", "User", "user@example.com", role),
            engineer.map(EngineerId::new),
        )
    }

    fn seeded() -> InMemoryStore {
        InMemoryStore::new()
            .with_engineers(vec![engineer("e1", "Ana"), engineer("e2", "Bruno")])
            .with_projects(vec![
                Project::new("p1", "Ponte", ProjectStatus::InProgress).with_estimated_hours(100.0),
                Project::new("p2", "Galpao", ProjectStatus::Completed).with_estimated_hours(50.0),
            ])
            .with_allocations(vec![
                Allocation::new("a1", "e1", "p1", 60.0).with_engineer_name("Ana"),
                Allocation::new("a2", "e2", "p1", 50.0).with_engineer_name("Bruno"),
                Allocation::new("a3", "e2", "p2", 70.0),
            ])
            .with_tasks(vec![
                Task::new("t1", "Fundacao", "p1", TaskStatus::Doing).with_engineer("e1"),
                Task::new("t2", "Estrutura", "p1", TaskStatus::Done).with_engineer("e2"),
                Task::new("t3", "Entrega", "p2", TaskStatus::Backlog).with_engineer("e2"),
            ])
            .with_hour_entries(vec![
                HourEntry::new("h1", "e1", "p1", TODAY, 8.0),
                HourEntry::new("h2", "e2", "p1", TODAY, 4.0).overtime(),
                HourEntry::new("h3", "e2", "p2", date!(2024 - 02 - 10), 10.0),
            ])
    }

    fn service(store: InMemoryStore) -> DashboardServiceImpl<InMemoryStore> {
        DashboardServiceImpl::new(Arc::new(store)).with_clock(Clock::Fixed(TODAY))
    }

    #[tokio::test]
    async fn manager_dashboard_covers_everything() {
        let dashboard = service(seeded())
            .dashboard(&session(Role::Manager, None), None)
            .await
            .unwrap();

        assert_eq!(dashboard.kpis.active_projects, 1);
        assert_eq!(dashboard.kpis.pending_tasks, 2);
        assert_eq!(dashboard.kpis.team_size, 2);
        assert_eq!(dashboard.kpis.month_hours, 12.0);
        // 8 * 100 + 4 * 150 + 10 * 100
        assert_eq!(dashboard.kpis.total_cost, Some(2400.0));
        assert_eq!(dashboard.task_status[&TaskStatus::Doing], 1);
        assert_eq!(dashboard.hours_chart.len(), 1);
        assert_eq!(dashboard.hours_chart[0].spent_hours, 12.0);
        assert_eq!(dashboard.recent_projects.len(), 2);
        assert_eq!(dashboard.filter_options.len(), 1);
    }

    #[tokio::test]
    async fn engineer_dashboard_is_scoped_and_hides_cost() {
        let dashboard = service(seeded())
            .dashboard(&session(Role::Engineer, Some("e1")), None)
            .await
            .unwrap();

        assert_eq!(dashboard.kpis.pending_tasks, 1);
        assert_eq!(dashboard.kpis.month_hours, 8.0);
        assert_eq!(dashboard.kpis.total_cost, None);
        let names: Vec<_> = dashboard
            .recent_projects
            .iter()
            .map(|p| p.project.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ponte"]);
    }

    #[tokio::test]
    async fn filtered_dashboard_counts_engineers_seen_on_project() {
        let dashboard = service(seeded())
            .dashboard(&session(Role::Admin, None), Some(&ProjectId::new("p2")))
            .await
            .unwrap();

        assert_eq!(dashboard.kpis.team_size, 1);
        assert_eq!(dashboard.kpis.active_projects, 0);
        assert_eq!(dashboard.kpis.month_hours, 0.0);
        assert_eq!(dashboard.hours_chart.len(), 1);
        assert_eq!(dashboard.hours_chart[0].spent_hours, 10.0);
        assert_eq!(dashboard.recent_projects[0].progress, 20.0);
    }

    #[tokio::test]
    async fn unlinked_engineer_gets_access_error() {
        let err = service(seeded())
            .dashboard(&session(Role::Engineer, None), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Access(AccessError::UnlinkedEngineer)
        ));
    }

    #[tokio::test]
    async fn allocation_overview_requires_privilege() {
        let service = service(seeded());

        let err = service
            .allocation_overview(&session(Role::Engineer, Some("e1")))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Access(AccessError::Forbidden(_))));

        let overview = service
            .allocation_overview(&session(Role::Manager, None))
            .await
            .unwrap();
        assert_eq!(overview.engineers[0].engineer_id, EngineerId::new("e1"));
        assert_eq!(overview.engineers[0].utilization, 60.0);
        assert_eq!(overview.engineers[1].utilization, 50.0);
        assert_eq!(overview.overloaded_count, 0);
    }

    #[tokio::test]
    async fn project_overview_rolls_up_team_and_tasks() {
        let overview = service(seeded())
            .project_overview(&session(Role::Manager, None), &ProjectId::new("p1"))
            .await
            .unwrap();

        assert_eq!(overview.spent_hours, 12.0);
        assert_eq!(overview.progress, 12.0);
        assert_eq!(overview.total_cost, Some(1400.0));
        assert_eq!((overview.done_tasks, overview.total_tasks), (1, 2));
        assert_eq!(overview.team.len(), 2);
        let bruno = overview.team.iter().find(|r| r.name == "Bruno").unwrap();
        assert_eq!(bruno.hours_logged, 4.0);
        assert_eq!(overview.hours_by_engineer[0], ("Ana".to_string(), 8.0));
    }

    #[tokio::test]
    async fn missing_project_overview_is_not_found() {
        let err = service(seeded())
            .project_overview(&session(Role::Manager, None), &ProjectId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::ProjectNotFound(_)));
    }
}
