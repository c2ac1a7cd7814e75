use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::domain::{
    aggregation::{self, TeamMember},
    models::{
        Allocation, AllocationId, AllocationInput, Client, ClientId, ClientInput, Engineer,
        EngineerId, EngineerInput, Project, ProjectId, ProjectInput, RecordFilter, UserId,
    },
    ports::{
        inbound::DirectoryService,
        outbound::{AllocationStore, ClientStore, EngineerStore, ProfileStore, ProjectStore},
    },
    services::project_scope,
    DirectoryError, SessionContext, StoreError,
};

/// Implementation of the DirectoryService inbound port.
pub struct DirectoryServiceImpl<S> {
    store: Arc<S>,
}

fn invalid(message: &str) -> DirectoryError {
    DirectoryError::InvalidInput(message.to_string())
}

fn require_name(name: &str) -> Result<(), DirectoryError> {
    if name.trim().is_empty() {
        return Err(invalid("name is required"));
    }
    Ok(())
}

fn require_non_negative(value: f64, field: &str) -> Result<(), DirectoryError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DirectoryError::InvalidInput(format!(
            "{field} must be zero or more"
        )));
    }
    Ok(())
}

fn validate_engineer(input: &EngineerInput) -> Result<(), DirectoryError> {
    require_name(&input.name)?;
    require_non_negative(input.normal_rate, "normal rate")?;
    require_non_negative(input.overtime_rate, "overtime rate")?;
    require_non_negative(input.availability, "availability")
}

fn validate_project(input: &ProjectInput) -> Result<(), DirectoryError> {
    require_name(&input.name)?;
    require_non_negative(input.estimated_hours, "estimated hours")?;
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        if start > end {
            return Err(invalid("start date must not be after end date"));
        }
    }
    Ok(())
}

impl<S> DirectoryServiceImpl<S>
where
    S: ClientStore + EngineerStore + ProjectStore + AllocationStore + ProfileStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// User id of the profile sharing the engineer's email, if any.
    async fn linked_user(&self, input: &EngineerInput) -> Result<Option<UserId>, StoreError> {
        let Some(email) = input.email.as_deref().filter(|e| !e.trim().is_empty()) else {
            return Ok(None);
        };

        let profile = self.store.find_profile_by_email(email.trim()).await?;
        Ok(profile.map(|p| p.id))
    }
}

#[async_trait]
impl<S> DirectoryService for DirectoryServiceImpl<S>
where
    S: ClientStore + EngineerStore + ProjectStore + AllocationStore + ProfileStore,
{
    async fn clients(&self, _session: &SessionContext) -> Result<Vec<Client>, DirectoryError> {
        Ok(self.store.list_clients().await?)
    }

    #[instrument(skip(self))]
    async fn create_client(
        &self,
        session: &SessionContext,
        input: ClientInput,
    ) -> Result<Client, DirectoryError> {
        session.require_privileged("creating clients")?;
        require_name(&input.name)?;
        Ok(self.store.insert_client(&input).await?)
    }

    #[instrument(skip(self))]
    async fn update_client(
        &self,
        session: &SessionContext,
        id: &ClientId,
        input: ClientInput,
    ) -> Result<(), DirectoryError> {
        session.require_privileged("editing clients")?;
        require_name(&input.name)?;
        Ok(self.store.update_client(id, &input).await?)
    }

    #[instrument(skip(self))]
    async fn delete_client(
        &self,
        session: &SessionContext,
        id: &ClientId,
    ) -> Result<(), DirectoryError> {
        session.require_privileged("deleting clients")?;
        Ok(self.store.delete_client(id).await?)
    }

    async fn engineers(&self, _session: &SessionContext) -> Result<Vec<Engineer>, DirectoryError> {
        Ok(self.store.list_engineers().await?)
    }

    #[instrument(skip(self))]
    async fn create_engineer(
        &self,
        session: &SessionContext,
        input: EngineerInput,
    ) -> Result<Engineer, DirectoryError> {
        session.require_privileged("creating engineers")?;
        validate_engineer(&input)?;

        let user_id = self.linked_user(&input).await?;
        let engineer = self
            .store
            .insert_engineer(&input, user_id.as_ref())
            .await?;
        tracing::info!(engineer_id = %engineer.id, linked = user_id.is_some(), "engineer created");
        Ok(engineer)
    }

    #[instrument(skip(self))]
    async fn update_engineer(
        &self,
        session: &SessionContext,
        id: &EngineerId,
        input: EngineerInput,
    ) -> Result<(), DirectoryError> {
        session.require_privileged("editing engineers")?;
        validate_engineer(&input)?;

        let user_id = self.linked_user(&input).await?;
        Ok(self
            .store
            .update_engineer(id, &input, user_id.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    async fn delete_engineer(
        &self,
        session: &SessionContext,
        id: &EngineerId,
    ) -> Result<(), DirectoryError> {
        session.require_privileged("deleting engineers")?;
        Ok(self.store.delete_engineer(id).await?)
    }

    async fn projects(&self, session: &SessionContext) -> Result<Vec<Project>, DirectoryError> {
        let scope = session.scope(RecordFilter::default())?;
        let filter = project_scope(self.store.as_ref(), &scope).await?;
        Ok(self.store.list_projects(&filter).await?)
    }

    #[instrument(skip(self))]
    async fn create_project(
        &self,
        session: &SessionContext,
        input: ProjectInput,
    ) -> Result<Project, DirectoryError> {
        session.require_privileged("creating projects")?;
        validate_project(&input)?;
        Ok(self.store.insert_project(&input).await?)
    }

    #[instrument(skip(self))]
    async fn update_project(
        &self,
        session: &SessionContext,
        id: &ProjectId,
        input: ProjectInput,
    ) -> Result<(), DirectoryError> {
        session.require_privileged("editing projects")?;
        validate_project(&input)?;
        Ok(self.store.update_project(id, &input).await?)
    }

    #[instrument(skip(self))]
    async fn delete_project(
        &self,
        session: &SessionContext,
        id: &ProjectId,
    ) -> Result<(), DirectoryError> {
        session.require_privileged("deleting projects")?;
        Ok(self.store.delete_project(id).await?)
    }

    async fn project_team(
        &self,
        _session: &SessionContext,
        project_id: &ProjectId,
    ) -> Result<Vec<TeamMember>, DirectoryError> {
        let team_filter = RecordFilter::for_project(project_id.clone());
        let (project, allocations) = tokio::try_join!(
            self.store.get_project(project_id),
            self.store.list_allocations(&team_filter),
        )?;
        let project =
            project.ok_or_else(|| StoreError::NotFound(format!("project {project_id}")))?;

        Ok(aggregation::team_members(&project, &allocations))
    }

    #[instrument(skip(self))]
    async fn allocate(
        &self,
        session: &SessionContext,
        input: AllocationInput,
    ) -> Result<Allocation, DirectoryError> {
        session.require_privileged("allocating engineers")?;
        if !input.percent.is_finite() || input.percent <= 0.0 {
            return Err(invalid("allocation percent must be positive"));
        }
        Ok(self.store.insert_allocation(&input).await?)
    }

    #[instrument(skip(self))]
    async fn remove_allocation(
        &self,
        session: &SessionContext,
        id: &AllocationId,
    ) -> Result<(), DirectoryError> {
        session.require_privileged("removing allocations")?;
        Ok(self.store.delete_allocation(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::memory::InMemoryStore,
        domain::{
            models::{Profile, ProjectStatus, Role},
            AccessError,
        },
    };

    fn session(role: Role, engineer: Option<&str>) -> SessionContext {
        SessionContext::new(
            "token",
            Profile::new("u1", "User", "user@example.com", role),
            engineer.map(EngineerId::new),
        )
    }

    fn engineer_input(name: &str, email: Option<&str>) -> EngineerInput {
        EngineerInput {
            name: name.to_string(),
            email: email.map(str::to_string),
            specialty: Some("Estruturas".to_string()),
            level: Some("Pleno".to_string()),
            normal_rate: 120.0,
            overtime_rate: 180.0,
            availability: 100.0,
        }
    }

    fn project_input(name: &str) -> ProjectInput {
        ProjectInput {
            name: name.to_string(),
            client_id: None,
            status: ProjectStatus::Planning,
            estimated_hours: 200.0,
            start_date: None,
            end_date: None,
        }
    }

    fn seeded() -> Arc<InMemoryStore> {
        Arc::new(
            InMemoryStore::new()
                .with_user(
                    Profile::new("u-ana", "Ana", "ana@example.com", Role::Engineer),
                    "pw",
                )
                .with_projects(vec![
                    Project::new("p1", "Ponte", ProjectStatus::InProgress)
                        .with_estimated_hours(400.0),
                    Project::new("p2", "Galpao", ProjectStatus::Planning),
                ])
                .with_allocations(vec![
                    Allocation::new("a1", "e1", "p1", 50.0).with_engineer_name("Ana"),
                    Allocation::new("a2", "e2", "p1", 25.0).with_engineer_name("Bruno"),
                ]),
        )
    }

    #[tokio::test]
    async fn engineer_email_links_to_existing_user() {
        let store = seeded();
        let service = DirectoryServiceImpl::new(store);
        let manager = session(Role::Manager, None);

        let linked = service
            .create_engineer(&manager, engineer_input("Ana", Some("ana@example.com")))
            .await
            .unwrap();
        let unlinked = service
            .create_engineer(&manager, engineer_input("Caio", Some("caio@example.com")))
            .await
            .unwrap();

        assert_eq!(linked.user_id, Some(UserId::new("u-ana")));
        assert_eq!(unlinked.user_id, None);
    }

    #[tokio::test]
    async fn engineers_cannot_write() {
        let store = seeded();
        let writes = store.write_count();
        let service = DirectoryServiceImpl::new(store.clone());
        let engineer = session(Role::Engineer, Some("e1"));

        let err = service
            .create_project(&engineer, project_input("Novo"))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Access(AccessError::Forbidden(_))));

        let err = service
            .delete_client(&engineer, &ClientId::new("c1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Access(AccessError::Forbidden(_))));
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn invalid_project_input_is_rejected() {
        let service = DirectoryServiceImpl::new(seeded());
        let manager = session(Role::Manager, None);

        let mut negative = project_input("Obra");
        negative.estimated_hours = -1.0;
        assert!(matches!(
            service.create_project(&manager, negative).await,
            Err(DirectoryError::InvalidInput(_))
        ));

        assert!(matches!(
            service.create_project(&manager, project_input(" ")).await,
            Err(DirectoryError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn engineer_project_listing_follows_allocations() {
        let service = DirectoryServiceImpl::new(seeded());

        let own = service
            .projects(&session(Role::Engineer, Some("e1")))
            .await
            .unwrap();
        let all = service.projects(&session(Role::Admin, None)).await.unwrap();

        assert_eq!(own.len(), 1);
        assert_eq!(own[0].id, ProjectId::new("p1"));
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn project_team_computes_allocated_hours() {
        let team = DirectoryServiceImpl::new(seeded())
            .project_team(&session(Role::Manager, None), &ProjectId::new("p1"))
            .await
            .unwrap();

        assert_eq!(team.len(), 2);
        assert_eq!(team[0].allocated_hours, 200.0);
        assert_eq!(team[1].allocated_hours, 100.0);
    }

    #[tokio::test]
    async fn team_of_missing_project_is_not_found() {
        let err = DirectoryServiceImpl::new(seeded())
            .project_team(&session(Role::Manager, None), &ProjectId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn allocation_requires_positive_percent() {
        let service = DirectoryServiceImpl::new(seeded());
        let manager = session(Role::Manager, None);

        let err = service
            .allocate(
                &manager,
                AllocationInput {
                    engineer_id: EngineerId::new("e1"),
                    project_id: ProjectId::new("p2"),
                    percent: 0.0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::InvalidInput(_)));

        let allocation = service
            .allocate(
                &manager,
                AllocationInput {
                    engineer_id: EngineerId::new("e1"),
                    project_id: ProjectId::new("p2"),
                    percent: 30.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(allocation.percent, 30.0);
    }
}
