use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::domain::{
    board::{Board, BoardView, MoveOutcome},
    models::{Project, ProjectFilter, ProjectId, ProjectStatus, RecordFilter, Task, TaskDraft, TaskId, TaskStatus},
    ports::{
        inbound::BoardService,
        outbound::{ProjectStore, TaskStore},
    },
    AccessError, BoardError, SessionContext,
};

/// Implementation of the BoardService inbound port.
///
/// The board lock is only held while touching the in-memory model, never
/// across a store call, so a slow remote update does not block other reads
/// of the same board.
pub struct BoardServiceImpl<S: TaskStore + ProjectStore> {
    store: Arc<S>,
    board: Arc<Mutex<Board>>,
}

impl<S: TaskStore + ProjectStore> BoardServiceImpl<S> {
    pub fn new(store: Arc<S>, board: Arc<Mutex<Board>>) -> Self {
        Self { store, board }
    }

    fn validate(draft: &TaskDraft) -> Result<(), BoardError> {
        if draft.title.trim().is_empty() {
            return Err(BoardError::InvalidTask("title is required".to_string()));
        }
        if !draft.estimated_hours.is_finite() || draft.estimated_hours < 0.0 {
            return Err(BoardError::InvalidTask(
                "estimated hours must be zero or more".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a task belongs on this session's board.
    fn is_visible(session: &SessionContext, task: &Task) -> bool {
        session
            .scope(RecordFilter::default())
            .map(|scope| scope.matches_engineer(task.engineer_id.as_ref()))
            .unwrap_or(false)
    }

    async fn load_with(
        &self,
        session: &SessionContext,
        project_id: Option<ProjectId>,
    ) -> Result<BoardView, BoardError> {
        let filter = session.scope(RecordFilter::default().with_project(project_id.clone()))?;
        let token = self.board.lock().await.begin_load(project_id);

        let tasks = self.store.list_tasks(&filter).await?;

        let mut board = self.board.lock().await;
        board.apply_load(token, tasks);
        Ok(board.view())
    }
}

#[async_trait]
impl<S: TaskStore + ProjectStore> BoardService for BoardServiceImpl<S> {
    #[instrument(skip(self))]
    async fn load(
        &self,
        session: &SessionContext,
        project_id: Option<&ProjectId>,
    ) -> Result<BoardView, BoardError> {
        self.load_with(session, project_id.cloned()).await
    }

    async fn projects(&self, _session: &SessionContext) -> Result<Vec<Project>, BoardError> {
        let mut projects = self
            .store
            .list_projects(&ProjectFilter::default().with_status(ProjectStatus::InProgress))
            .await?;
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    #[instrument(skip(self))]
    async fn create_task(
        &self,
        session: &SessionContext,
        draft: TaskDraft,
    ) -> Result<Task, BoardError> {
        Self::validate(&draft)?;

        let task = self.store.insert_task(&draft).await?;
        if Self::is_visible(session, &task) {
            self.board.lock().await.upsert(task.clone());
        }
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn update_task(
        &self,
        session: &SessionContext,
        task_id: &TaskId,
        mut draft: TaskDraft,
    ) -> Result<Task, BoardError> {
        Self::validate(&draft)?;

        let scope = session.scope(RecordFilter::default())?;
        let current = self
            .store
            .get_task(task_id)
            .await?
            .ok_or_else(|| BoardError::TaskNotFound(task_id.clone()))?;
        if !scope.matches_engineer(current.engineer_id.as_ref()) {
            return Err(AccessError::Forbidden("editing another engineer's task").into());
        }
        // Engineers keep their own tasks.
        if scope.engineer_id.is_some() {
            draft.engineer_id = scope.engineer_id;
        }

        self.store.update_task(task_id, &draft).await?;
        let task = self
            .store
            .get_task(task_id)
            .await?
            .ok_or_else(|| BoardError::TaskNotFound(task_id.clone()))?;

        if Self::is_visible(session, &task) {
            self.board.lock().await.upsert(task.clone());
        }
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn move_task(
        &self,
        session: &SessionContext,
        task_id: &TaskId,
        target: TaskStatus,
    ) -> Result<BoardView, BoardError> {
        let outcome = self.board.lock().await.begin_move(task_id, target)?;
        let from = match outcome {
            MoveOutcome::Unchanged => return Ok(self.board.lock().await.view()),
            MoveOutcome::Pending { from } => from,
        };

        match self.store.update_task_status(task_id, target).await {
            Ok(()) => {
                let mut board = self.board.lock().await;
                board.commit_move(task_id);
                tracing::debug!(%task_id, ?from, ?target, "task moved");
                Ok(board.view())
            }
            Err(err) => {
                tracing::warn!(%task_id, ?from, ?target, "task move rejected: {}", err);
                let project_id = {
                    let mut board = self.board.lock().await;
                    board.rollback_move(task_id);
                    board.project_filter().cloned()
                };

                if let Err(reload_err) = self.load_with(session, project_id).await {
                    tracing::warn!("board reload after rejected move failed: {}", reload_err);
                }
                Err(BoardError::Store(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::outbound::memory::InMemoryStore,
        domain::models::{EngineerId, Profile, Role},
    };
    use std::time::Duration;

    fn session(role: Role, engineer: Option<&str>) -> SessionContext {
        SessionContext::new(
            "token",
            Profile::new("u1", "User", "user@example.com", role),
            engineer.map(EngineerId::new),
        )
    }

    fn seeded() -> Arc<InMemoryStore> {
        Arc::new(
            InMemoryStore::new()
                .with_projects(vec![
                    Project::new("p1", "Ponte", ProjectStatus::InProgress),
                    Project::new("p2", "Galpao", ProjectStatus::Paused),
                ])
                .with_tasks(vec![
                    Task::new("t1", "Fundacao", "p1", TaskStatus::Todo).with_engineer("e1"),
                    Task::new("t2", "Estrutura", "p1", TaskStatus::Doing).with_engineer("e2"),
                    Task::new("t3", "Projeto", "p2", TaskStatus::Backlog),
                ]),
        )
    }

    fn service(store: Arc<InMemoryStore>) -> BoardServiceImpl<InMemoryStore> {
        BoardServiceImpl::new(store, Arc::new(Mutex::new(Board::new())))
    }

    #[tokio::test]
    async fn successful_move_persists() {
        let store = seeded();
        let service = service(store.clone());
        let manager = session(Role::Manager, None);
        let t1 = TaskId::new("t1");

        service.load(&manager, None).await.unwrap();
        let view = service
            .move_task(&manager, &t1, TaskStatus::Doing)
            .await
            .unwrap();
        assert_eq!(view.status_of(&t1), Some(TaskStatus::Doing));
        assert!(!view.column(TaskStatus::Doing).unwrap().cards[0].pending);

        let reloaded = service.load(&manager, None).await.unwrap();
        assert_eq!(reloaded.status_of(&t1), Some(TaskStatus::Doing));
        assert_eq!(store.task_status(&t1), Some(TaskStatus::Doing));
    }

    #[tokio::test]
    async fn rejected_move_rolls_back_and_reloads() {
        let store = seeded();
        let service = service(store.clone());
        let manager = session(Role::Manager, None);
        let t1 = TaskId::new("t1");

        service.load(&manager, None).await.unwrap();
        store.fail_status_updates("permission denied for table atividades");

        let err = service
            .move_task(&manager, &t1, TaskStatus::Done)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "permission denied for table atividades");

        let view = service.load(&manager, None).await.unwrap();
        assert_eq!(view.status_of(&t1), Some(TaskStatus::Todo));
        assert_eq!(store.task_status(&t1), Some(TaskStatus::Todo));
    }

    #[tokio::test]
    async fn move_to_current_status_does_not_touch_store() {
        let store = seeded();
        let service = service(store.clone());
        let manager = session(Role::Manager, None);

        service.load(&manager, None).await.unwrap();
        store.fail_status_updates("should not be called");

        let view = service
            .move_task(&manager, &TaskId::new("t2"), TaskStatus::Doing)
            .await
            .unwrap();
        assert_eq!(view.status_of(&TaskId::new("t2")), Some(TaskStatus::Doing));
    }

    #[tokio::test]
    async fn new_task_starts_in_backlog() {
        let store = seeded();
        let service = service(store);
        let manager = session(Role::Manager, None);
        service.load(&manager, None).await.unwrap();

        let task = service
            .create_task(&manager, TaskDraft::new("Cobertura", "p1"))
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Backlog);
        let view = service.load(&manager, None).await.unwrap();
        assert_eq!(view.status_of(&task.id), Some(TaskStatus::Backlog));
    }

    #[tokio::test]
    async fn editing_preserves_status() {
        let store = seeded();
        let service = service(store);
        let manager = session(Role::Manager, None);
        service.load(&manager, None).await.unwrap();

        let task = service
            .update_task(
                &manager,
                &TaskId::new("t2"),
                TaskDraft::new("Estrutura metalica", "p1").with_engineer("e2"),
            )
            .await
            .unwrap();

        assert_eq!(task.title, "Estrutura metalica");
        assert_eq!(task.status, TaskStatus::Doing);
    }

    #[tokio::test]
    async fn engineer_cannot_edit_someone_elses_task() {
        let store = seeded();
        let writes = store.write_count();

        let err = service(store.clone())
            .update_task(
                &session(Role::Engineer, Some("e1")),
                &TaskId::new("t2"),
                TaskDraft::new("Estrutura", "p1").with_engineer("e1"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, BoardError::Access(AccessError::Forbidden(_))));
        assert_eq!(store.write_count(), writes);
    }

    #[tokio::test]
    async fn engineer_cannot_reassign_own_task() {
        let task = service(seeded())
            .update_task(
                &session(Role::Engineer, Some("e1")),
                &TaskId::new("t1"),
                TaskDraft::new("Fundacao profunda", "p1").with_engineer("e2"),
            )
            .await
            .unwrap();

        assert_eq!(task.title, "Fundacao profunda");
        assert_eq!(task.engineer_id, Some(EngineerId::new("e1")));
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let service = service(seeded());
        let err = service
            .create_task(&session(Role::Manager, None), TaskDraft::new("  ", "p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::InvalidTask(_)));
    }

    #[tokio::test]
    async fn engineer_sees_only_own_tasks() {
        let store = seeded();

        let engineer_view = service(store.clone())
            .load(&session(Role::Engineer, Some("e1")), None)
            .await
            .unwrap();
        let manager_view = service(store)
            .load(&session(Role::Manager, None), None)
            .await
            .unwrap();

        let count = |view: &BoardView| view.columns.iter().map(|c| c.count()).sum::<usize>();
        assert_eq!(count(&engineer_view), 1);
        assert_eq!(engineer_view.status_of(&TaskId::new("t1")), Some(TaskStatus::Todo));
        assert_eq!(count(&manager_view), 3);
    }

    #[tokio::test]
    async fn unlinked_engineer_cannot_load_board() {
        let err = service(seeded())
            .load(&session(Role::Engineer, None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::Access(AccessError::UnlinkedEngineer)));
    }

    #[tokio::test]
    async fn project_filter_narrows_board() {
        let view = service(seeded())
            .load(&session(Role::Admin, None), Some(&ProjectId::new("p2")))
            .await
            .unwrap();
        assert_eq!(view.column(TaskStatus::Backlog).unwrap().count(), 1);
        assert_eq!(view.column(TaskStatus::Todo).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn board_projects_are_in_progress_only() {
        let projects = service(seeded())
            .projects(&session(Role::Engineer, Some("e1")))
            .await
            .unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Ponte");
    }

    #[tokio::test]
    async fn stale_load_does_not_overwrite_newer_one() {
        let store = seeded();
        let service = service(store.clone());
        let manager = session(Role::Manager, None);
        let t1 = TaskId::new("t1");

        store.delay_next_task_list(Duration::from_millis(50));
        let slow = service.load(&manager, None);
        let fast = async {
            tokio::task::yield_now().await;
            store
                .update_task_status(&t1, TaskStatus::Review)
                .await
                .unwrap();
            service.load(&manager, None).await
        };

        let (slow, fast) = tokio::join!(slow, fast);
        slow.unwrap();
        fast.unwrap();

        let view = service.board.lock().await.view();
        assert_eq!(view.status_of(&t1), Some(TaskStatus::Review));
    }

    #[tokio::test]
    async fn second_move_while_pending_is_rejected() {
        let store = seeded();
        let board = Arc::new(Mutex::new(Board::new()));
        let service = BoardServiceImpl::new(store.clone(), board.clone());
        let manager = session(Role::Manager, None);
        let t1 = TaskId::new("t1");
        service.load(&manager, None).await.unwrap();

        board.lock().await.begin_move(&t1, TaskStatus::Doing).unwrap();

        let err = service
            .move_task(&manager, &t1, TaskStatus::Review)
            .await
            .unwrap_err();
        assert!(matches!(err, BoardError::MoveInFlight(_)));
        assert_eq!(store.task_status(&t1), Some(TaskStatus::Todo));
    }
}
