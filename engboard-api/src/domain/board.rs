//! In-memory kanban board with optimistic moves.
//!
//! A move is applied locally first and marked pending while the remote update
//! is in flight. The status last confirmed by the store is kept alongside, so a
//! failed update can be reverted exactly. Loads are tagged with a token and
//! only the most recently issued load may replace the cards.

use std::collections::BTreeMap;

use tokio::sync::watch;

use super::{
    models::{ProjectId, Task, TaskId, TaskStatus},
    BoardError,
};

/// Token identifying one board load. Only the latest issued token is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct BoardCard {
    pub task: Task,
    /// Status last confirmed by the store.
    pub committed: TaskStatus,
    pub pending: bool,
}

impl BoardCard {
    fn committed(task: Task) -> Self {
        Self {
            committed: task.status,
            task,
            pending: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub cards: Vec<BoardCard>,
}

impl BoardColumn {
    pub fn count(&self) -> usize {
        self.cards.len()
    }
}

/// Renderable snapshot of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub columns: Vec<BoardColumn>,
    pub revision: u64,
}

impl BoardView {
    pub fn column(&self, status: TaskStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.status == status)
    }

    pub fn status_of(&self, task_id: &TaskId) -> Option<TaskStatus> {
        self.columns
            .iter()
            .flat_map(|c| c.cards.iter())
            .find(|card| &card.task.id == task_id)
            .map(|card| card.task.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Target equals the current status; nothing to send.
    Unchanged,
    /// Applied locally; the remote update must follow.
    Pending { from: TaskStatus },
}

pub struct Board {
    /// Cards in fetch order (most recently updated first).
    cards: Vec<BoardCard>,
    latest_token: u64,
    /// Project filter of the latest load.
    project: Option<ProjectId>,
    revision: watch::Sender<u64>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            cards: Vec::new(),
            latest_token: 0,
            project: None,
            revision,
        }
    }

    /// Receiver that observes every revision bump. Each bump means the board
    /// should be re-rendered.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    pub fn begin_load(&mut self, project: Option<ProjectId>) -> LoadToken {
        self.latest_token += 1;
        self.project = project;
        LoadToken(self.latest_token)
    }

    pub fn project_filter(&self) -> Option<&ProjectId> {
        self.project.as_ref()
    }

    /// Replace the cards with a fetched task list.
    ///
    /// Returns `false` and leaves the board untouched when a newer load has
    /// been issued since `token`. Cards with a move in flight keep their local
    /// state so the optimistic position does not flicker.
    pub fn apply_load(&mut self, token: LoadToken, tasks: Vec<Task>) -> bool {
        if token.0 != self.latest_token {
            tracing::debug!(
                token = token.0,
                latest = self.latest_token,
                "discarding stale board load"
            );
            return false;
        }

        let mut pending: BTreeMap<TaskId, BoardCard> = self
            .cards
            .drain(..)
            .filter(|card| card.pending)
            .map(|card| (card.task.id.clone(), card))
            .collect();

        self.cards = tasks
            .into_iter()
            .map(|task| {
                pending
                    .remove(&task.id)
                    .unwrap_or_else(|| BoardCard::committed(task))
            })
            .collect();
        self.bump();
        true
    }

    pub fn begin_move(
        &mut self,
        task_id: &TaskId,
        target: TaskStatus,
    ) -> Result<MoveOutcome, BoardError> {
        let card = self.card_mut(task_id)?;
        if card.pending {
            return Err(BoardError::MoveInFlight(task_id.clone()));
        }
        if card.task.status == target {
            return Ok(MoveOutcome::Unchanged);
        }

        let from = card.task.status;
        card.task.status = target;
        card.pending = true;
        self.bump();
        Ok(MoveOutcome::Pending { from })
    }

    /// Confirm a pending move. A card that is no longer pending (e.g. replaced
    /// by a load) is left alone.
    pub fn commit_move(&mut self, task_id: &TaskId) {
        if let Ok(card) = self.card_mut(task_id) {
            if card.pending {
                card.committed = card.task.status;
                card.pending = false;
                self.bump();
            }
        }
    }

    /// Revert a pending move to the last committed status.
    pub fn rollback_move(&mut self, task_id: &TaskId) {
        if let Ok(card) = self.card_mut(task_id) {
            if card.pending {
                card.task.status = card.committed;
                card.pending = false;
                self.bump();
            }
        }
    }

    /// Insert or replace a task after a create or edit. New cards go first.
    /// A card with a move in flight keeps its local status. Tasks outside the
    /// board's project filter are left off the board.
    pub fn upsert(&mut self, task: Task) {
        let position = self.cards.iter().position(|c| c.task.id == task.id);
        if self.project.as_ref().is_some_and(|p| p != &task.project_id) {
            if let Some(index) = position {
                self.cards.remove(index);
                self.bump();
            }
            return;
        }

        match position {
            Some(index) if self.cards[index].pending => {
                let card = &mut self.cards[index];
                let local = card.task.status;
                card.committed = task.status;
                card.task = Task {
                    status: local,
                    ..task
                };
            }
            Some(index) => self.cards[index] = BoardCard::committed(task),
            None => self.cards.insert(0, BoardCard::committed(task)),
        }
        self.bump();
    }

    pub fn get(&self, task_id: &TaskId) -> Option<&BoardCard> {
        self.cards.iter().find(|c| &c.task.id == task_id)
    }

    pub fn view(&self) -> BoardView {
        let columns = TaskStatus::ALL
            .into_iter()
            .map(|status| BoardColumn {
                status,
                cards: self
                    .cards
                    .iter()
                    .filter(|c| c.task.status == status)
                    .cloned()
                    .collect(),
            })
            .collect();

        BoardView {
            columns,
            revision: self.revision(),
        }
    }

    fn card_mut(&mut self, task_id: &TaskId) -> Result<&mut BoardCard, BoardError> {
        self.cards
            .iter_mut()
            .find(|c| &c.task.id == task_id)
            .ok_or_else(|| BoardError::TaskNotFound(task_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task::new(id, format!("Task {id}"), "p1", status)
    }

    fn loaded(tasks: Vec<Task>) -> Board {
        let mut board = Board::new();
        let token = board.begin_load(None);
        assert!(board.apply_load(token, tasks));
        board
    }

    #[test]
    fn move_is_pending_until_committed() {
        let mut board = loaded(vec![task("t1", TaskStatus::Todo)]);
        let id = TaskId::new("t1");

        let outcome = board.begin_move(&id, TaskStatus::Doing).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Pending {
                from: TaskStatus::Todo
            }
        );
        let card = board.get(&id).unwrap();
        assert!(card.pending);
        assert_eq!(card.task.status, TaskStatus::Doing);
        assert_eq!(card.committed, TaskStatus::Todo);

        board.commit_move(&id);
        let card = board.get(&id).unwrap();
        assert!(!card.pending);
        assert_eq!(card.committed, TaskStatus::Doing);
    }

    #[test]
    fn rollback_restores_committed_status() {
        let mut board = loaded(vec![task("t1", TaskStatus::Todo)]);
        let id = TaskId::new("t1");

        board.begin_move(&id, TaskStatus::Done).unwrap();
        board.rollback_move(&id);

        let view = board.view();
        assert_eq!(view.status_of(&id), Some(TaskStatus::Todo));
        assert_eq!(view.column(TaskStatus::Done).unwrap().count(), 0);
        assert_eq!(view.column(TaskStatus::Todo).unwrap().count(), 1);
    }

    #[test]
    fn second_move_while_pending_is_rejected() {
        let mut board = loaded(vec![task("t1", TaskStatus::Todo)]);
        let id = TaskId::new("t1");

        board.begin_move(&id, TaskStatus::Doing).unwrap();
        let err = board.begin_move(&id, TaskStatus::Review).unwrap_err();
        assert!(matches!(err, BoardError::MoveInFlight(_)));
    }

    #[test]
    fn move_to_same_status_is_unchanged() {
        let mut board = loaded(vec![task("t1", TaskStatus::Review)]);
        let before = board.revision();

        let outcome = board
            .begin_move(&TaskId::new("t1"), TaskStatus::Review)
            .unwrap();

        assert_eq!(outcome, MoveOutcome::Unchanged);
        assert_eq!(board.revision(), before);
    }

    #[test]
    fn moving_unknown_task_fails() {
        let mut board = loaded(vec![]);
        let err = board
            .begin_move(&TaskId::new("nope"), TaskStatus::Done)
            .unwrap_err();
        assert!(matches!(err, BoardError::TaskNotFound(_)));
    }

    #[test]
    fn stale_load_is_discarded() {
        let mut board = Board::new();
        let first = board.begin_load(None);
        let second = board.begin_load(None);

        assert!(board.apply_load(second, vec![task("t1", TaskStatus::Done)]));
        assert!(!board.apply_load(first, vec![task("t1", TaskStatus::Todo)]));

        assert_eq!(
            board.view().status_of(&TaskId::new("t1")),
            Some(TaskStatus::Done)
        );
    }

    #[test]
    fn load_keeps_pending_cards_local() {
        let mut board = loaded(vec![task("t1", TaskStatus::Todo)]);
        let id = TaskId::new("t1");
        board.begin_move(&id, TaskStatus::Doing).unwrap();

        let token = board.begin_load(None);
        board.apply_load(
            token,
            vec![task("t1", TaskStatus::Todo), task("t2", TaskStatus::Backlog)],
        );

        let card = board.get(&id).unwrap();
        assert!(card.pending);
        assert_eq!(card.task.status, TaskStatus::Doing);
        assert!(board.get(&TaskId::new("t2")).is_some());
    }

    #[test]
    fn upsert_keeps_pending_status() {
        let mut board = loaded(vec![task("t1", TaskStatus::Todo)]);
        let id = TaskId::new("t1");
        board.begin_move(&id, TaskStatus::Review).unwrap();

        let mut edited = task("t1", TaskStatus::Todo);
        edited.title = "Renamed".to_string();
        board.upsert(edited);

        let card = board.get(&id).unwrap();
        assert_eq!(card.task.title, "Renamed");
        assert_eq!(card.task.status, TaskStatus::Review);
        assert!(card.pending);
    }

    #[test]
    fn load_remembers_project_filter() {
        let mut board = Board::new();
        board.begin_load(Some(ProjectId::new("p7")));
        assert_eq!(board.project_filter(), Some(&ProjectId::new("p7")));
    }

    #[test]
    fn upsert_respects_project_filter() {
        let mut board = Board::new();
        let token = board.begin_load(Some(ProjectId::new("p1")));
        assert!(board.apply_load(token, vec![task("t1", TaskStatus::Todo)]));
        let mut rx = board.subscribe();
        rx.borrow_and_update();

        board.upsert(Task::new("t2", "Elsewhere", "p2", TaskStatus::Backlog));
        assert!(board.get(&TaskId::new("t2")).is_none());
        assert!(!rx.has_changed().unwrap());

        board.upsert(task("t3", TaskStatus::Backlog));
        assert!(board.get(&TaskId::new("t3")).is_some());

        board.upsert(Task::new("t1", "Moved away", "p2", TaskStatus::Todo));
        assert!(board.get(&TaskId::new("t1")).is_none());
    }

    #[test]
    fn columns_follow_board_order_with_counts() {
        let board = loaded(vec![
            task("t1", TaskStatus::Done),
            task("t2", TaskStatus::Backlog),
            task("t3", TaskStatus::Done),
        ]);

        let view = board.view();
        let counts: Vec<_> = view.columns.iter().map(|c| (c.status, c.count())).collect();
        assert_eq!(
            counts,
            vec![
                (TaskStatus::Backlog, 1),
                (TaskStatus::Todo, 0),
                (TaskStatus::Doing, 0),
                (TaskStatus::Review, 0),
                (TaskStatus::Done, 2),
            ]
        );
    }

    #[test]
    fn subscribers_see_revision_bumps() {
        let mut board = loaded(vec![task("t1", TaskStatus::Todo)]);
        let mut rx = board.subscribe();
        let start = *rx.borrow_and_update();

        board.begin_move(&TaskId::new("t1"), TaskStatus::Doing).unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), start + 1);
    }
}
