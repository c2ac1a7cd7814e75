use async_trait::async_trait;

use crate::domain::{
    aggregation::TeamMember,
    models::{
        Allocation, AllocationId, AllocationInput, Client, ClientId, ClientInput, Engineer,
        EngineerId, EngineerInput, Project, ProjectId, ProjectInput,
    },
    DirectoryError, SessionContext,
};

/// Inbound port for managing clients, engineers, projects and allocations.
///
/// Reads are open to every role (project listings are scoped for engineers);
/// writes require an admin or manager.
#[async_trait]
pub trait DirectoryService: Send + Sync + 'static {
    async fn clients(&self, session: &SessionContext) -> Result<Vec<Client>, DirectoryError>;
    async fn create_client(
        &self,
        session: &SessionContext,
        input: ClientInput,
    ) -> Result<Client, DirectoryError>;
    async fn update_client(
        &self,
        session: &SessionContext,
        id: &ClientId,
        input: ClientInput,
    ) -> Result<(), DirectoryError>;
    async fn delete_client(&self, session: &SessionContext, id: &ClientId)
        -> Result<(), DirectoryError>;

    async fn engineers(&self, session: &SessionContext) -> Result<Vec<Engineer>, DirectoryError>;
    /// Create an engineer, linking it to the user with the same email if one exists.
    async fn create_engineer(
        &self,
        session: &SessionContext,
        input: EngineerInput,
    ) -> Result<Engineer, DirectoryError>;
    async fn update_engineer(
        &self,
        session: &SessionContext,
        id: &EngineerId,
        input: EngineerInput,
    ) -> Result<(), DirectoryError>;
    async fn delete_engineer(
        &self,
        session: &SessionContext,
        id: &EngineerId,
    ) -> Result<(), DirectoryError>;

    async fn projects(&self, session: &SessionContext) -> Result<Vec<Project>, DirectoryError>;
    async fn create_project(
        &self,
        session: &SessionContext,
        input: ProjectInput,
    ) -> Result<Project, DirectoryError>;
    async fn update_project(
        &self,
        session: &SessionContext,
        id: &ProjectId,
        input: ProjectInput,
    ) -> Result<(), DirectoryError>;
    async fn delete_project(
        &self,
        session: &SessionContext,
        id: &ProjectId,
    ) -> Result<(), DirectoryError>;

    /// Allocations on a project with the hours they cover.
    async fn project_team(
        &self,
        session: &SessionContext,
        project_id: &ProjectId,
    ) -> Result<Vec<TeamMember>, DirectoryError>;
    async fn allocate(
        &self,
        session: &SessionContext,
        input: AllocationInput,
    ) -> Result<Allocation, DirectoryError>;
    async fn remove_allocation(
        &self,
        session: &SessionContext,
        id: &AllocationId,
    ) -> Result<(), DirectoryError>;
}
