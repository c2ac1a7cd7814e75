use async_trait::async_trait;

use crate::domain::{
    models::{RecordFilter, Task, TaskDraft, TaskId, TaskStatus},
    StoreError,
};

#[async_trait]
pub trait TaskStore: Send + Sync + 'static {
    /// Tasks matching `filter`, most recently updated first, with project and
    /// engineer names embedded.
    async fn list_tasks(&self, filter: &RecordFilter) -> Result<Vec<Task>, StoreError>;

    async fn get_task(&self, id: &TaskId) -> Result<Option<Task>, StoreError>;

    /// Store a new task in the backlog.
    async fn insert_task(&self, draft: &TaskDraft) -> Result<Task, StoreError>;

    /// Overwrite the editable fields of a task, leaving its status alone.
    async fn update_task(&self, id: &TaskId, draft: &TaskDraft) -> Result<(), StoreError>;

    async fn update_task_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), StoreError>;
}
