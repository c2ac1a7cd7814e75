use std::sync::Arc;

use async_trait::async_trait;
use time::Date;
use tracing::instrument;

use crate::domain::{
    aggregation,
    models::{
        HourEntry, HourEntryId, HourEntryRequest, HoursHistory, HoursReport, NewHourEntry,
        Project, ProjectFilter, ProjectId, ProjectStatus, RecordFilter, ReportFilter, Task,
    },
    ports::{
        inbound::TimeLogService,
        outbound::{EntryOrder, HourEntryStore, ProjectStore, TaskStore},
    },
    AccessError, Clock, SessionContext, StoreError, TimeLogError,
};

const HISTORY_LIMIT: usize = 20;

/// Implementation of the TimeLogService inbound port.
pub struct TimeLogServiceImpl<S> {
    store: Arc<S>,
    clock: Clock,
}

impl<S> TimeLogServiceImpl<S>
where
    S: HourEntryStore + ProjectStore + TaskStore,
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

    async fn own_today_total(&self, session: &SessionContext) -> Result<f64, StoreError> {
        let Some(engineer_id) = session.engineer_id() else {
            return Ok(0.0);
        };

        let today = self.clock.today();
        let filter = RecordFilter::for_engineer(engineer_id.clone()).between(Some(today), Some(today));
        let entries = self
            .store
            .list_hour_entries(&filter, EntryOrder::Latest)
            .await?;
        Ok(aggregation::today_total(&entries, Some(engineer_id), today))
    }
}

/// First and last day of the month containing `today`.
fn month_bounds(today: Date) -> (Date, Date) {
    let last_day = time::util::days_in_year_month(today.year(), today.month());
    (
        today.replace_day(1).unwrap_or(today),
        today.replace_day(last_day).unwrap_or(today),
    )
}

#[async_trait]
impl<S> TimeLogService for TimeLogServiceImpl<S>
where
    S: HourEntryStore + ProjectStore + TaskStore,
{
    #[instrument(skip(self))]
    async fn history(&self, session: &SessionContext) -> Result<HoursHistory, TimeLogError> {
        let filter = session.scope(RecordFilter::default().with_limit(HISTORY_LIMIT))?;

        let (entries, today_total) = tokio::try_join!(
            self.store.list_hour_entries(&filter, EntryOrder::Latest),
            self.own_today_total(session),
        )?;

        Ok(HoursHistory {
            entries,
            today_total,
        })
    }

    async fn loggable_projects(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<Project>, TimeLogError> {
        // Any in-progress project takes hours, allocated or not.
        session.scope(RecordFilter::default())?;
        let filter = ProjectFilter::default().with_status(ProjectStatus::InProgress);

        let mut projects = self.store.list_projects(&filter).await?;
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn loggable_tasks(
        &self,
        _session: &SessionContext,
        project_id: &ProjectId,
    ) -> Result<Vec<Task>, TimeLogError> {
        let mut tasks: Vec<_> = self
            .store
            .list_tasks(&RecordFilter::for_project(project_id.clone()))
            .await?
            .into_iter()
            .filter(|t| t.status.accepts_hours())
            .collect();
        tasks.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(tasks)
    }

    #[instrument(skip(self))]
    async fn log_hours(
        &self,
        session: &SessionContext,
        request: HourEntryRequest,
    ) -> Result<HourEntry, TimeLogError> {
        if !request.hours.is_finite() || request.hours <= 0.0 {
            return Err(TimeLogError::InvalidHours);
        }

        let engineer_id = if session.is_engineer() {
            session.engineer_id().cloned()
        } else {
            request.engineer_id.or_else(|| session.engineer_id().cloned())
        }
        .ok_or(TimeLogError::EngineerUnresolved)?;

        let entry = NewHourEntry {
            engineer_id,
            project_id: request.project_id,
            task_id: request.task_id,
            date: request.date,
            hours: request.hours,
            hour_type: request.hour_type,
            note: request.note.filter(|n| !n.trim().is_empty()),
        };

        let stored = self.store.insert_hour_entry(&entry).await?;
        tracing::info!(
            entry_id = %stored.id,
            engineer_id = %stored.engineer_id,
            hours = stored.hours,
            "hours logged"
        );
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn delete_entry(
        &self,
        session: &SessionContext,
        entry_id: &HourEntryId,
    ) -> Result<(), TimeLogError> {
        let entry = self
            .store
            .get_hour_entry(entry_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("hour entry {entry_id}")))?;

        if session.is_engineer() && session.engineer_id() != Some(&entry.engineer_id) {
            return Err(AccessError::Forbidden("deleting another engineer's hours").into());
        }

        self.store.delete_hour_entry(entry_id).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn report(
        &self,
        session: &SessionContext,
        filter: ReportFilter,
    ) -> Result<HoursReport, TimeLogError> {
        let (month_start, month_end) = month_bounds(self.clock.today());
        let from = filter.from.unwrap_or(month_start);
        let to = filter.to.unwrap_or(month_end);
        if from > to {
            return Err(TimeLogError::InvalidDateRange);
        }

        let query = session.scope(
            RecordFilter::default()
                .with_project(filter.project_id)
                .with_engineer(filter.engineer_id)
                .between(Some(from), Some(to)),
        )?;

        let rows = self
            .store
            .list_hour_entries(&query, EntryOrder::Chronological)
            .await?;
        let total_hours = aggregation::total_hours(&rows);

        Ok(HoursReport {
            from,
            to,
            rows,
            total_hours,
        })
    }
}
