use async_trait::async_trait;

use crate::domain::{
    board::BoardView,
    models::{Project, ProjectId, Task, TaskDraft, TaskId, TaskStatus},
    BoardError, SessionContext,
};

/// Inbound port for the kanban board.
///
/// The service is created per request but operates on the caller's board,
/// which lives for the whole session.
#[async_trait]
pub trait BoardService: Send + Sync + 'static {
    /// Fetch the (scoped) tasks and replace the board with them.
    async fn load(
        &self,
        session: &SessionContext,
        project_id: Option<&ProjectId>,
    ) -> Result<BoardView, BoardError>;

    /// In-progress projects, used as board filter and task form options.
    async fn projects(&self, session: &SessionContext) -> Result<Vec<Project>, BoardError>;

    /// Create a task. It always starts in the backlog.
    async fn create_task(
        &self,
        session: &SessionContext,
        draft: TaskDraft,
    ) -> Result<Task, BoardError>;

    /// Edit a task's fields. Its status is preserved.
    async fn update_task(
        &self,
        session: &SessionContext,
        task_id: &TaskId,
        draft: TaskDraft,
    ) -> Result<Task, BoardError>;

    /// Move a task to another column.
    ///
    /// The move shows up immediately and is reverted if the store rejects it,
    /// in which case the store's error is returned.
    async fn move_task(
        &self,
        session: &SessionContext,
        task_id: &TaskId,
        target: TaskStatus,
    ) -> Result<BoardView, BoardError>;
}
