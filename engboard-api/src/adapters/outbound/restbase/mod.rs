mod conversions;

use async_trait::async_trait;
use ::restbase::{Order, Query, RestbaseClient, RestbaseError};

use crate::domain::{
    models::{
        Allocation, AllocationId, AllocationInput, Client, ClientId, ClientInput, Engineer,
        EngineerId, EngineerInput, HourEntry, HourEntryId, NewHourEntry, Profile, Project,
        ProjectFilter, ProjectId, ProjectInput, RecordFilter, Task, TaskDraft, TaskId, TaskStatus,
        UserId,
    },
    ports::outbound::{
        AllocationStore, AuthGrant, AuthProvider, ClientStore, EngineerStore, EntryOrder,
        HourEntryStore, ProfileStore, ProjectStore, TaskStore,
    },
    StoreError,
};

use self::conversions::{
    now_timestamp, project_status_to_wire, task_status_to_wire, AllocationRow, AllocationWrite,
    ClientRow, ClientWrite, EngineerRow, EngineerWrite, HourEntryRow, HourEntryWrite, ProjectRow,
    ProjectWrite, TaskRow, TaskStatusWrite, TaskWrite, UserRow, ALLOCATIONS, ALLOCATION_SELECT,
    CLIENTS, ENGINEERS, ENTRY_SELECT, HOUR_ENTRIES, PROJECTS, PROJECT_SELECT, TASKS, TASK_SELECT,
    USERS,
};

/// Map a restbase client error to the store error of the domain.
fn map_restbase_error(error: RestbaseError) -> StoreError {
    match error {
        RestbaseError::Unauthorized => StoreError::Unauthorized,
        RestbaseError::NotFound(what) => StoreError::NotFound(what),
        RestbaseError::Response { message, .. } => StoreError::Rejected(message),
        other => StoreError::Unavailable(other.to_string()),
    }
}

/// Narrow a query by the project, engineer and date range of `filter`.
fn apply_record_filter(mut query: Query, filter: &RecordFilter, dated: bool) -> Query {
    if let Some(project_id) = &filter.project_id {
        query = query.eq("projeto_id", project_id);
    }
    if let Some(engineer_id) = &filter.engineer_id {
        query = query.eq("engenheiro_id", engineer_id);
    }
    if dated {
        if let Some(from) = filter.from {
            query = query.gte("data", from);
        }
        if let Some(to) = filter.to {
            query = query.lte("data", to);
        }
    }
    if let Some(limit) = filter.limit {
        query = query.limit(limit);
    }
    query
}

/// Adapter that wraps a `RestbaseClient` to implement the store ports.
///
/// The client carries the caller's access token, so row-level rules on the
/// remote side apply to every call.
pub struct RestbaseStore {
    client: RestbaseClient,
}

impl RestbaseStore {
    pub fn new(client: RestbaseClient) -> Self {
        Self { client }
    }
}

/// Adapter for the auth endpoints. Uses the anonymous client; per-token calls
/// derive a client carrying that token.
pub struct RestbaseAuth {
    client: RestbaseClient,
}

impl RestbaseAuth {
    pub fn new(client: RestbaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthProvider for RestbaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, StoreError> {
        let credentials = self
            .client
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| match e {
                // Wrong credentials come back as a plain 400.
                RestbaseError::Response { status: 400, .. } => StoreError::Unauthorized,
                other => map_restbase_error(other),
            })?;

        Ok(AuthGrant {
            access_token: credentials.access_token,
            user_id: UserId::new(credentials.user.id),
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<UserId, StoreError> {
        let user = self
            .client
            .with_access_token(access_token)
            .get_user()
            .await
            .map_err(map_restbase_error)?;
        Ok(UserId::new(user.id))
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        self.client
            .with_access_token(access_token)
            .sign_out()
            .await
            .map_err(map_restbase_error)
    }
}

#[async_trait]
impl ProfileStore for RestbaseStore {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        let row: Option<UserRow> = self
            .client
            .select_one(Query::new(USERS).eq("id", user_id))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.map(Profile::from))
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        let row: Option<UserRow> = self
            .client
            .select_one(Query::new(USERS).eq("email", email))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.map(Profile::from))
    }
}

#[async_trait]
impl ClientStore for RestbaseStore {
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        let rows: Vec<ClientRow> = self
            .client
            .select(&Query::new(CLIENTS).order("nome", Order::Ascending))
            .await
            .map_err(map_restbase_error)?;
        Ok(rows.into_iter().map(Client::from).collect())
    }

    async fn insert_client(&self, input: &ClientInput) -> Result<Client, StoreError> {
        let row: ClientRow = self
            .client
            .insert(CLIENTS, &ClientWrite::from(input))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.into())
    }

    async fn update_client(&self, id: &ClientId, input: &ClientInput) -> Result<(), StoreError> {
        self.client
            .update(CLIENTS, id.as_str(), &ClientWrite::from(input))
            .await
            .map_err(map_restbase_error)
    }

    async fn delete_client(&self, id: &ClientId) -> Result<(), StoreError> {
        self.client
            .delete(CLIENTS, id.as_str())
            .await
            .map_err(map_restbase_error)
    }
}

#[async_trait]
impl EngineerStore for RestbaseStore {
    async fn list_engineers(&self) -> Result<Vec<Engineer>, StoreError> {
        let rows: Vec<EngineerRow> = self
            .client
            .select(&Query::new(ENGINEERS).order("nome", Order::Ascending))
            .await
            .map_err(map_restbase_error)?;
        Ok(rows.into_iter().map(Engineer::from).collect())
    }

    async fn find_engineer_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Engineer>, StoreError> {
        let row: Option<EngineerRow> = self
            .client
            .select_one(Query::new(ENGINEERS).eq("usuario_id", user_id))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.map(Engineer::from))
    }

    async fn insert_engineer(
        &self,
        input: &EngineerInput,
        user_id: Option<&UserId>,
    ) -> Result<Engineer, StoreError> {
        let body = EngineerWrite::new(input, user_id.map(|id| id.as_str()));
        let row: EngineerRow = self
            .client
            .insert(ENGINEERS, &body)
            .await
            .map_err(map_restbase_error)?;
        Ok(row.into())
    }

    async fn update_engineer(
        &self,
        id: &EngineerId,
        input: &EngineerInput,
        user_id: Option<&UserId>,
    ) -> Result<(), StoreError> {
        let body = EngineerWrite::new(input, user_id.map(|id| id.as_str()));
        self.client
            .update(ENGINEERS, id.as_str(), &body)
            .await
            .map_err(map_restbase_error)
    }

    async fn delete_engineer(&self, id: &EngineerId) -> Result<(), StoreError> {
        self.client
            .delete(ENGINEERS, id.as_str())
            .await
            .map_err(map_restbase_error)
    }
}

#[async_trait]
impl ProjectStore for RestbaseStore {
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let mut query = Query::new(PROJECTS)
            .select(PROJECT_SELECT)
            .order("created_at", Order::Descending);
        if let Some(ids) = &filter.ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            query = query.in_list("id", ids);
        }
        if let Some(status) = filter.status {
            query = query.eq("status", project_status_to_wire(status));
        }

        let rows: Vec<ProjectRow> = self
            .client
            .select(&query)
            .await
            .map_err(map_restbase_error)?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let row: Option<ProjectRow> = self
            .client
            .select_one(Query::new(PROJECTS).select(PROJECT_SELECT).eq("id", id))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.map(Project::from))
    }

    async fn insert_project(&self, input: &ProjectInput) -> Result<Project, StoreError> {
        let row: ProjectRow = self
            .client
            .insert(PROJECTS, &ProjectWrite::from(input))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.into())
    }

    async fn update_project(&self, id: &ProjectId, input: &ProjectInput) -> Result<(), StoreError> {
        self.client
            .update(PROJECTS, id.as_str(), &ProjectWrite::from(input))
            .await
            .map_err(map_restbase_error)
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError> {
        self.client
            .delete(PROJECTS, id.as_str())
            .await
            .map_err(map_restbase_error)
    }
}

#[async_trait]
impl AllocationStore for RestbaseStore {
    async fn list_allocations(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<Allocation>, StoreError> {
        let query = apply_record_filter(
            Query::new(ALLOCATIONS).select(ALLOCATION_SELECT),
            filter,
            false,
        );
        let rows: Vec<AllocationRow> = self
            .client
            .select(&query)
            .await
            .map_err(map_restbase_error)?;
        Ok(rows.into_iter().map(Allocation::from).collect())
    }

    async fn insert_allocation(&self, input: &AllocationInput) -> Result<Allocation, StoreError> {
        let body = AllocationWrite {
            engenheiro_id: input.engineer_id.as_str(),
            projeto_id: input.project_id.as_str(),
            percentual: input.percent,
        };
        let row: AllocationRow = self
            .client
            .insert(ALLOCATIONS, &body)
            .await
            .map_err(map_restbase_error)?;
        Ok(row.into())
    }

    async fn delete_allocation(&self, id: &AllocationId) -> Result<(), StoreError> {
        self.client
            .delete(ALLOCATIONS, id.as_str())
            .await
            .map_err(map_restbase_error)
    }
}

#[async_trait]
impl TaskStore for RestbaseStore {
    async fn list_tasks(&self, filter: &RecordFilter) -> Result<Vec<Task>, StoreError> {
        let query = apply_record_filter(
            Query::new(TASKS)
                .select(TASK_SELECT)
                .order("updated_at", Order::Descending),
            filter,
            false,
        );
        let rows: Vec<TaskRow> = self
            .client
            .select(&query)
            .await
            .map_err(map_restbase_error)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        let row: Option<TaskRow> = self
            .client
            .select_one(Query::new(TASKS).select(TASK_SELECT).eq("id", id))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.map(Task::from))
    }

    async fn insert_task(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let row: TaskRow = self
            .client
            .insert(TASKS, &TaskWrite::insert(draft))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.into())
    }

    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<(), StoreError> {
        self.client
            .update(TASKS, id.as_str(), &TaskWrite::update(draft))
            .await
            .map_err(map_restbase_error)
    }

    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), StoreError> {
        let body = TaskStatusWrite {
            status: task_status_to_wire(status),
            updated_at: now_timestamp(),
        };
        self.client
            .update(TASKS, id.as_str(), &body)
            .await
            .map_err(map_restbase_error)
    }
}

#[async_trait]
impl HourEntryStore for RestbaseStore {
    async fn list_hour_entries(
        &self,
        filter: &RecordFilter,
        order: EntryOrder,
    ) -> Result<Vec<HourEntry>, StoreError> {
        let query = Query::new(HOUR_ENTRIES).select(ENTRY_SELECT);
        let query = match order {
            EntryOrder::Latest => query
                .order("data", Order::Descending)
                .order("created_at", Order::Descending),
            EntryOrder::Chronological => query.order("data", Order::Ascending),
        };
        let query = apply_record_filter(query, filter, true);

        let rows: Vec<HourEntryRow> = self
            .client
            .select(&query)
            .await
            .map_err(map_restbase_error)?;
        Ok(rows.into_iter().filter_map(HourEntryRow::into_domain).collect())
    }

    async fn get_hour_entry(&self, id: &HourEntryId) -> Result<Option<HourEntry>, StoreError> {
        let row: Option<HourEntryRow> = self
            .client
            .select_one(Query::new(HOUR_ENTRIES).select(ENTRY_SELECT).eq("id", id))
            .await
            .map_err(map_restbase_error)?;
        Ok(row.and_then(HourEntryRow::into_domain))
    }

    async fn insert_hour_entry(&self, entry: &NewHourEntry) -> Result<HourEntry, StoreError> {
        let row: HourEntryRow = self
            .client
            .insert(HOUR_ENTRIES, &HourEntryWrite::from(entry))
            .await
            .map_err(map_restbase_error)?;
        row.into_domain().ok_or_else(|| {
            StoreError::Unavailable("stored hour entry came back without a date".to_string())
        })
    }

    async fn delete_hour_entry(&self, id: &HourEntryId) -> Result<(), StoreError> {
        self.client
            .delete(HOUR_ENTRIES, id.as_str())
            .await
            .map_err(map_restbase_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn record_filter_becomes_query_pairs() {
        let filter = RecordFilter::for_project("p1")
            .with_engineer(Some(EngineerId::new("e1")))
            .between(Some(date!(2024 - 03 - 01)), Some(date!(2024 - 03 - 31)))
            .with_limit(20);

        let pairs = apply_record_filter(Query::new(HOUR_ENTRIES), &filter, true).as_query_pairs();

        assert!(pairs.contains(&("projeto_id".to_string(), "eq.p1".to_string())));
        assert!(pairs.contains(&("engenheiro_id".to_string(), "eq.e1".to_string())));
        assert!(pairs.contains(&("data".to_string(), "gte.2024-03-01".to_string())));
        assert!(pairs.contains(&("data".to_string(), "lte.2024-03-31".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "20".to_string())));
    }

    #[test]
    fn forbidden_responses_are_rejections_with_the_store_message() {
        let err = map_restbase_error(RestbaseError::Response {
            status: 403,
            message: "permission denied for table atividades".to_string(),
        });
        assert_eq!(
            err,
            StoreError::Rejected("permission denied for table atividades".to_string())
        );

        assert_eq!(
            map_restbase_error(RestbaseError::Unauthorized),
            StoreError::Unauthorized
        );
    }

    #[test]
    fn undated_tables_ignore_the_range() {
        let filter = RecordFilter::for_project("p1")
            .between(Some(date!(2024 - 03 - 01)), None);

        let pairs = apply_record_filter(Query::new(TASKS), &filter, false).as_query_pairs();

        assert!(!pairs.iter().any(|(k, _)| k == "data"));
    }

    #[test]
    fn response_errors_surface_the_raw_message() {
        let error = map_restbase_error(RestbaseError::Response {
            status: 403,
            message: "permission denied for table atividades".to_string(),
        });
        assert_eq!(
            error,
            StoreError::Rejected("permission denied for table atividades".to_string())
        );
        assert!(matches!(
            map_restbase_error(RestbaseError::Transport("timeout".to_string())),
            StoreError::Unavailable(_)
        ));
    }
}
