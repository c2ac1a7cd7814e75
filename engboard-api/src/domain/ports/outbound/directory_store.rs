use async_trait::async_trait;

use crate::domain::{
    models::{
        Allocation, AllocationId, AllocationInput, Client, ClientId, ClientInput, Engineer,
        EngineerId, EngineerInput, Profile, Project, ProjectFilter, ProjectId, ProjectInput,
        RecordFilter, UserId,
    },
    StoreError,
};

#[async_trait]
pub trait ClientStore: Send + Sync + 'static {
    /// All clients, ordered by name.
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError>;
    async fn insert_client(&self, input: &ClientInput) -> Result<Client, StoreError>;
    async fn update_client(&self, id: &ClientId, input: &ClientInput) -> Result<(), StoreError>;
    async fn delete_client(&self, id: &ClientId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait EngineerStore: Send + Sync + 'static {
    /// All engineers, ordered by name.
    async fn list_engineers(&self) -> Result<Vec<Engineer>, StoreError>;

    /// The engineer record linked to an auth user, if any.
    async fn find_engineer_by_user(&self, user_id: &UserId)
        -> Result<Option<Engineer>, StoreError>;

    async fn insert_engineer(
        &self,
        input: &EngineerInput,
        user_id: Option<&UserId>,
    ) -> Result<Engineer, StoreError>;

    async fn update_engineer(
        &self,
        id: &EngineerId,
        input: &EngineerInput,
        user_id: Option<&UserId>,
    ) -> Result<(), StoreError>;

    /// Not guarded against rows that still reference the engineer.
    async fn delete_engineer(&self, id: &EngineerId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync + 'static {
    /// Projects matching `filter`, newest first, with the client name embedded.
    async fn list_projects(&self, filter: &ProjectFilter) -> Result<Vec<Project>, StoreError>;
    async fn get_project(&self, id: &ProjectId) -> Result<Option<Project>, StoreError>;
    async fn insert_project(&self, input: &ProjectInput) -> Result<Project, StoreError>;
    async fn update_project(&self, id: &ProjectId, input: &ProjectInput)
        -> Result<(), StoreError>;
    async fn delete_project(&self, id: &ProjectId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AllocationStore: Send + Sync + 'static {
    /// Allocations matching the project and engineer of `filter`, with the
    /// engineer name embedded.
    async fn list_allocations(&self, filter: &RecordFilter)
        -> Result<Vec<Allocation>, StoreError>;
    async fn insert_allocation(&self, input: &AllocationInput) -> Result<Allocation, StoreError>;
    async fn delete_allocation(&self, id: &AllocationId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    async fn get_profile(&self, user_id: &UserId) -> Result<Option<Profile>, StoreError>;
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError>;
}
