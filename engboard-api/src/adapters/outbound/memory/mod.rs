//! In-memory implementation of every outbound store port.
//!
//! Backs the `memory` store backend for local runs and doubles as the test
//! store: it supports failure injection and a one-shot delayed task listing.

mod seed;

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
    time::Duration,
};

use async_trait::async_trait;
use time::OffsetDateTime;

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

#[derive(Default)]
struct Tables {
    users: Vec<(Profile, String)>,
    sessions: HashMap<String, UserId>,
    clients: Vec<Client>,
    engineers: Vec<Engineer>,
    projects: Vec<Project>,
    allocations: Vec<Allocation>,
    tasks: Vec<Task>,
    hour_entries: Vec<HourEntry>,
}

#[derive(Default)]
struct Failures {
    status_updates: Option<String>,
    writes: Option<String>,
    task_list_delay: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    failures: Arc<RwLock<Failures>>,
    next_id: Arc<AtomicU64>,
    writes: Arc<AtomicU64>,
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

fn not_found(kind: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::NotFound(format!("{kind} {id}"))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a small demo data set.
    pub fn demo() -> Self {
        seed::demo(Self::new())
    }

    fn seed(self, fill: impl FnOnce(&mut Tables)) -> Self {
        if let Ok(mut tables) = self.tables.write() {
            fill(&mut tables);
        }
        self
    }

    /// Register a user that can sign in with `password`.
    pub fn with_user(self, profile: Profile, password: &str) -> Self {
        let password = password.to_string();
        self.seed(|t| t.users.push((profile, password)))
    }

    pub fn with_clients(self, clients: Vec<Client>) -> Self {
        self.seed(|t| t.clients.extend(clients))
    }

    pub fn with_engineers(self, engineers: Vec<Engineer>) -> Self {
        self.seed(|t| t.engineers.extend(engineers))
    }

    pub fn with_projects(self, projects: Vec<Project>) -> Self {
        self.seed(|t| t.projects.extend(projects))
    }

    pub fn with_allocations(self, allocations: Vec<Allocation>) -> Self {
        self.seed(|t| t.allocations.extend(allocations))
    }

    pub fn with_tasks(self, tasks: Vec<Task>) -> Self {
        self.seed(|t| t.tasks.extend(tasks))
    }

    pub fn with_hour_entries(self, entries: Vec<HourEntry>) -> Self {
        self.seed(|t| t.hour_entries.extend(entries))
    }

    /// Make every task status update fail with `message`.
    pub fn fail_status_updates(&self, message: &str) {
        if let Ok(mut failures) = self.failures.write() {
            failures.status_updates = Some(message.to_string());
        }
    }

    /// Make every write fail with `message`.
    pub fn fail_writes(&self, message: &str) {
        if let Ok(mut failures) = self.failures.write() {
            failures.writes = Some(message.to_string());
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failures) = self.failures.write() {
            *failures = Failures::default();
        }
    }

    /// Delay the response of the next task listing. The rows are read before
    /// the delay, so the response reflects the state at call time.
    pub fn delay_next_task_list(&self, delay: Duration) {
        if let Ok(mut failures) = self.failures.write() {
            failures.task_list_delay = Some(delay);
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tables
            .read()
            .map(|t| t.tasks.clone())
            .unwrap_or_default()
    }

    pub fn hour_entries(&self) -> Vec<HourEntry> {
        self.tables
            .read()
            .map(|t| t.hour_entries.clone())
            .unwrap_or_default()
    }

    pub fn task_status(&self, id: &TaskId) -> Option<TaskStatus> {
        self.tables
            .read()
            .ok()?
            .tasks
            .iter()
            .find(|t| &t.id == id)
            .map(|t| t.status)
    }

    /// Number of writes that reached the tables.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(poisoned)
    }

    /// Lock the tables for a write, honoring injected write failures.
    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        if let Some(message) = self.failures.read().map_err(poisoned)?.writes.clone() {
            return Err(StoreError::Rejected(message));
        }
        let tables = self.tables.write().map_err(poisoned)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(tables)
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{prefix}-{n}")
    }
}

impl Tables {
    fn engineer_name(&self, id: &EngineerId) -> Option<String> {
        self.engineers
            .iter()
            .find(|e| &e.id == id)
            .map(|e| e.name.clone())
    }

    fn project_name(&self, id: &ProjectId) -> Option<String> {
        self.projects
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.name.clone())
    }

    fn client_name(&self, id: Option<&ClientId>) -> Option<String> {
        let id = id?;
        self.clients
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.clone())
    }

    /// Fill the embedded names the remote store would join in.
    fn embed_task(&self, mut task: Task) -> Task {
        task.project_name = task
            .project_name
            .or_else(|| self.project_name(&task.project_id));
        if let Some(engineer_id) = &task.engineer_id {
            task.engineer_name = task
                .engineer_name
                .or_else(|| self.engineer_name(engineer_id));
        }
        task
    }

    fn embed_entry(&self, mut entry: HourEntry) -> HourEntry {
        entry.project_name = entry
            .project_name
            .or_else(|| self.project_name(&entry.project_id));
        entry.engineer_name = entry
            .engineer_name
            .or_else(|| self.engineer_name(&entry.engineer_id));
        if let Some(task_id) = &entry.task_id {
            entry.task_title = entry.task_title.or_else(|| {
                self.tasks
                    .iter()
                    .find(|t| &t.id == task_id)
                    .map(|t| t.title.clone())
            });
        }
        entry
    }

    fn embed_project(&self, mut project: Project) -> Project {
        project.client_name = project
            .client_name
            .or_else(|| self.client_name(project.client_id.as_ref()));
        project
    }
}

#[async_trait]
impl AuthProvider for InMemoryStore {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, StoreError> {
        let user_id = self
            .read()?
            .users
            .iter()
            .find(|(profile, pw)| profile.email.eq_ignore_ascii_case(email) && pw == password)
            .map(|(profile, _)| profile.id.clone())
            .ok_or(StoreError::Unauthorized)?;

        let access_token = self.next_id("mem");
        self.tables
            .write()
            .map_err(poisoned)?
            .sessions
            .insert(access_token.clone(), user_id.clone());

        Ok(AuthGrant {
            access_token,
            user_id,
        })
    }

    async fn current_user(&self, access_token: &str) -> Result<UserId, StoreError> {
        self.read()?
            .sessions
            .get(access_token)
            .cloned()
            .ok_or(StoreError::Unauthorized)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), StoreError> {
        self.tables
            .write()
            .map_err(poisoned)?
            .sessions
            .remove(access_token);
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|(p, _)| &p.id == user_id)
            .map(|(p, _)| p.clone()))
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .read()?
            .users
            .iter()
            .find(|(p, _)| p.email.eq_ignore_ascii_case(email))
            .map(|(p, _)| p.clone()))
    }
}

#[async_trait]
impl ClientStore for InMemoryStore {
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        let mut clients = self.read()?.clients.clone();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn insert_client(&self, input: &ClientInput) -> Result<Client, StoreError> {
        let client = Client {
            id: ClientId::new(self.next_id("client")),
            name: input.name.clone(),
            tax_id: input.tax_id.clone(),
            contact: input.contact.clone(),
            email: input.email.clone(),
        };
        self.write()?.clients.push(client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: &ClientId, input: &ClientInput) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let client = tables
            .clients
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| not_found("client", id))?;
        client.name = input.name.clone();
        client.tax_id = input.tax_id.clone();
        client.contact = input.contact.clone();
        client.email = input.email.clone();
        Ok(())
    }

    async fn delete_client(&self, id: &ClientId) -> Result<(), StoreError> {
        self.write()?.clients.retain(|c| &c.id != id);
        Ok(())
    }
}

#[async_trait]
impl EngineerStore for InMemoryStore {
    async fn list_engineers(&self) -> Result<Vec<Engineer>, StoreError> {
        let mut engineers = self.read()?.engineers.clone();
        engineers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(engineers)
    }

    async fn find_engineer_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Option<Engineer>, StoreError> {
        Ok(self
            .read()?
            .engineers
            .iter()
            .find(|e| e.user_id.as_ref() == Some(user_id))
            .cloned())
    }

    async fn insert_engineer(
        &self,
        input: &EngineerInput,
        user_id: Option<&UserId>,
    ) -> Result<Engineer, StoreError> {
        let engineer = Engineer {
            id: EngineerId::new(self.next_id("engineer")),
            name: input.name.clone(),
            email: input.email.clone(),
            specialty: input.specialty.clone(),
            level: input.level.clone(),
            normal_rate: input.normal_rate,
            overtime_rate: input.overtime_rate,
            availability: input.availability,
            user_id: user_id.cloned(),
        };
        self.write()?.engineers.push(engineer.clone());
        Ok(engineer)
    }

    async fn update_engineer(
        &self,
        id: &EngineerId,
        input: &EngineerInput,
        user_id: Option<&UserId>,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let engineer = tables
            .engineers
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| not_found("engineer", id))?;
        engineer.name = input.name.clone();
        engineer.email = input.email.clone();
        engineer.specialty = input.specialty.clone();
        engineer.level = input.level.clone();
        engineer.normal_rate = input.normal_rate;
        engineer.overtime_rate = input.overtime_rate;
        engineer.availability = input.availability;
        engineer.user_id = user_id.cloned();
        Ok(())
    }

    async fn delete_engineer(&self, id: &EngineerId) -> Result<(), StoreError> {
        self.write()?.engineers.retain(|e| &e.id != id);
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, StoreError> {
        let tables = self.read()?;
        let mut projects: Vec<_> = tables
            .projects
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .map(|p| tables.embed_project(p))
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .projects
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .map(|p| tables.embed_project(p)))
    }

    async fn insert_project(&self, input: &ProjectInput) -> Result<Project, StoreError> {
        let project = Project {
            id: ProjectId::new(self.next_id("project")),
            name: input.name.clone(),
            client_id: input.client_id.clone(),
            client_name: None,
            status: input.status,
            estimated_hours: input.estimated_hours,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: Some(OffsetDateTime::now_utc()),
        };
        let mut tables = self.write()?;
        tables.projects.push(project.clone());
        Ok(tables.embed_project(project))
    }

    async fn update_project(&self, id: &ProjectId, input: &ProjectInput) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let project = tables
            .projects
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| not_found("project", id))?;
        project.name = input.name.clone();
        project.client_id = input.client_id.clone();
        project.client_name = None;
        project.status = input.status;
        project.estimated_hours = input.estimated_hours;
        project.start_date = input.start_date;
        project.end_date = input.end_date;
        Ok(())
    }

    async fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError> {
        self.write()?.projects.retain(|p| &p.id != id);
        Ok(())
    }
}

#[async_trait]
impl AllocationStore for InMemoryStore {
    async fn list_allocations(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<Allocation>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .allocations
            .iter()
            .filter(|a| filter.matches_project(&a.project_id))
            .filter(|a| filter.matches_engineer(Some(&a.engineer_id)))
            .cloned()
            .map(|mut a| {
                a.engineer_name = a
                    .engineer_name
                    .or_else(|| tables.engineer_name(&a.engineer_id));
                a
            })
            .collect())
    }

    async fn insert_allocation(&self, input: &AllocationInput) -> Result<Allocation, StoreError> {
        let mut allocation = Allocation::new(
            self.next_id("allocation"),
            input.engineer_id.clone(),
            input.project_id.clone(),
            input.percent,
        );
        let mut tables = self.write()?;
        tables.allocations.push(allocation.clone());
        allocation.engineer_name = tables.engineer_name(&allocation.engineer_id);
        Ok(allocation)
    }

    async fn delete_allocation(&self, id: &AllocationId) -> Result<(), StoreError> {
        self.write()?.allocations.retain(|a| &a.id != id);
        Ok(())
    }
}

#[async_trait]
impl TaskStore for InMemoryStore {
    async fn list_tasks(&self, filter: &RecordFilter) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<_> = {
            let tables = self.read()?;
            tables
                .tasks
                .iter()
                .filter(|t| filter.matches_project(&t.project_id))
                .filter(|t| filter.matches_engineer(t.engineer_id.as_ref()))
                .cloned()
                .map(|t| tables.embed_task(t))
                .collect()
        };
        tasks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        if let Some(limit) = filter.limit {
            tasks.truncate(limit);
        }

        let delay = self.failures.write().map_err(poisoned)?.task_list_delay.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(tasks)
    }

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .tasks
            .iter()
            .find(|t| &t.id == id)
            .cloned()
            .map(|t| tables.embed_task(t)))
    }

    async fn insert_task(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let task = Task {
            id: TaskId::new(self.next_id("task")),
            title: draft.title.clone(),
            description: draft.description.clone(),
            project_id: draft.project_id.clone(),
            engineer_id: draft.engineer_id.clone(),
            status: TaskStatus::Backlog,
            estimated_hours: draft.estimated_hours,
            deadline: draft.deadline,
            project_name: None,
            engineer_name: None,
            updated_at: Some(OffsetDateTime::now_utc()),
        };
        let mut tables = self.write()?;
        tables.tasks.push(task.clone());
        Ok(tables.embed_task(task))
    }

    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| not_found("task", id))?;
        task.title = draft.title.clone();
        task.description = draft.description.clone();
        task.project_id = draft.project_id.clone();
        task.engineer_id = draft.engineer_id.clone();
        task.estimated_hours = draft.estimated_hours;
        task.deadline = draft.deadline;
        task.project_name = None;
        task.engineer_name = None;
        task.updated_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), StoreError> {
        if let Some(message) = self.failures.read().map_err(poisoned)?.status_updates.clone() {
            return Err(StoreError::Rejected(message));
        }

        let mut tables = self.write()?;
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| not_found("task", id))?;
        task.status = status;
        task.updated_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }
}

#[async_trait]
impl HourEntryStore for InMemoryStore {
    async fn list_hour_entries(
        &self,
        filter: &RecordFilter,
        order: EntryOrder,
    ) -> Result<Vec<HourEntry>, StoreError> {
        let tables = self.read()?;
        let mut entries: Vec<_> = tables
            .hour_entries
            .iter()
            .filter(|e| filter.matches_project(&e.project_id))
            .filter(|e| filter.matches_engineer(Some(&e.engineer_id)))
            .filter(|e| filter.matches_date(e.date))
            .cloned()
            .map(|e| tables.embed_entry(e))
            .collect();

        match order {
            EntryOrder::Latest => entries.sort_by(|a, b| {
                b.date
                    .cmp(&a.date)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
            EntryOrder::Chronological => entries.sort_by(|a, b| a.date.cmp(&b.date)),
        }
        if let Some(limit) = filter.limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn get_hour_entry(&self, id: &HourEntryId) -> Result<Option<HourEntry>, StoreError> {
        let tables = self.read()?;
        Ok(tables
            .hour_entries
            .iter()
            .find(|e| &e.id == id)
            .cloned()
            .map(|e| tables.embed_entry(e)))
    }

    async fn insert_hour_entry(&self, entry: &NewHourEntry) -> Result<HourEntry, StoreError> {
        let mut stored = HourEntry::new(
            self.next_id("entry"),
            entry.engineer_id.clone(),
            entry.project_id.clone(),
            entry.date,
            entry.hours,
        );
        stored.task_id = entry.task_id.clone();
        stored.hour_type = entry.hour_type;
        stored.note = entry.note.clone();
        stored.created_at = Some(OffsetDateTime::now_utc());

        let mut tables = self.write()?;
        tables.hour_entries.push(stored.clone());
        Ok(tables.embed_entry(stored))
    }

    async fn delete_hour_entry(&self, id: &HourEntryId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let before = tables.hour_entries.len();
        tables.hour_entries.retain(|e| &e.id != id);
        if tables.hour_entries.len() == before {
            return Err(not_found("hour entry", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{ProjectStatus, Role};
    use time::macros::date;

    #[tokio::test]
    async fn lists_embed_names() {
        let store = InMemoryStore::new()
            .with_projects(vec![Project::new("p1", "Ponte", ProjectStatus::InProgress)])
            .with_tasks(vec![Task::new("t1", "Sondagem", "p1", TaskStatus::Todo)]);

        let tasks = store.list_tasks(&RecordFilter::default()).await.unwrap();
        assert_eq!(tasks[0].project_name.as_deref(), Some("Ponte"));
    }

    #[tokio::test]
    async fn hour_entries_honor_range_and_order() {
        let store = InMemoryStore::new().with_hour_entries(vec![
            HourEntry::new("h1", "e1", "p1", date!(2024 - 03 - 10), 1.0),
            HourEntry::new("h2", "e1", "p1", date!(2024 - 03 - 01), 2.0),
            HourEntry::new("h3", "e1", "p1", date!(2024 - 04 - 01), 3.0),
        ]);
        let march = RecordFilter::default()
            .between(Some(date!(2024 - 03 - 01)), Some(date!(2024 - 03 - 31)));

        let latest = store
            .list_hour_entries(&march, EntryOrder::Latest)
            .await
            .unwrap();
        let chronological = store
            .list_hour_entries(&march, EntryOrder::Chronological)
            .await
            .unwrap();

        assert_eq!(latest[0].id, HourEntryId::new("h1"));
        assert_eq!(chronological[0].id, HourEntryId::new("h2"));
        assert_eq!(latest.len(), 2);
    }

    #[tokio::test]
    async fn injected_write_failure_leaves_tables_untouched() {
        let store = InMemoryStore::new();
        store.fail_writes("read-only");

        let err = store
            .insert_task(&TaskDraft::new("Nova", "p1"))
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Rejected("read-only".to_string()));
        assert!(store.tasks().is_empty());
        assert_eq!(store.write_count(), 0);

        store.clear_failures();
        store.insert_task(&TaskDraft::new("Nova", "p1")).await.unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn sign_out_revokes_token() {
        let store = InMemoryStore::new().with_user(
            Profile::new("u1", "Ana", "ana@example.com", Role::Admin),
            "pw",
        );

        let grant = store.sign_in("ANA@example.com", "pw").await.unwrap();
        assert_eq!(store.current_user(&grant.access_token).await.unwrap(), UserId::new("u1"));

        store.sign_out(&grant.access_token).await.unwrap();
        assert_eq!(
            store.current_user(&grant.access_token).await,
            Err(StoreError::Unauthorized)
        );
    }
}
