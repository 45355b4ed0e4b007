//! Id-keyed task state.
//!
//! Each tool owns one board; a new generation replaces the whole batch.
//! Updates address tasks by id, never by position, and carry the batch
//! token so a completion arriving after the batch was superseded is dropped
//! instead of merged into the wrong batch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use mf_core::{BatchToken, GenerationTask, TaskBatch, TaskId, TaskStatus};

#[derive(Debug, Clone)]
pub enum TaskUpdate<T> {
    Progress {
        status: TaskStatus,
        message: Option<String>,
    },
    Done(T),
    Failed(String),
}

#[derive(Debug)]
pub struct TaskBoard<T> {
    token: Option<BatchToken>,
    order: Vec<TaskId>,
    tasks: HashMap<TaskId, GenerationTask<T>>,
}

impl<T: Clone> TaskBoard<T> {
    pub fn new() -> Self {
        Self {
            token: None,
            order: Vec::new(),
            tasks: HashMap::new(),
        }
    }

    /// Install a new batch, discarding the previous one wholesale.
    pub fn begin_batch(&mut self, batch: TaskBatch<T>) -> BatchToken {
        let token = batch.token;
        self.token = Some(token);
        self.order = batch.tasks.iter().map(|t| t.id).collect();
        self.tasks = batch.tasks.into_iter().map(|t| (t.id, t)).collect();
        token
    }

    pub fn token(&self) -> Option<BatchToken> {
        self.token
    }

    /// Apply an update as an atomic record replacement.
    ///
    /// Returns false (and changes nothing) when the token is stale, the id
    /// is unknown, or the task already reached a terminal state.
    pub fn apply(&mut self, token: BatchToken, id: TaskId, update: TaskUpdate<T>) -> bool {
        if self.token != Some(token) {
            tracing::debug!(%token, %id, "dropping stale task update");
            return false;
        }
        let Some(task) = self.tasks.get_mut(&id) else {
            return false;
        };
        if task.status.is_terminal() {
            return false;
        }

        let mut next = task.clone();
        match update {
            TaskUpdate::Progress { status, message } => {
                next.status = status;
                next.status_message = message;
            }
            TaskUpdate::Done(result) => {
                next.status = TaskStatus::Done;
                next.result = Some(result);
                next.status_message = None;
                next.completed_at = Some(Utc::now());
            }
            TaskUpdate::Failed(error) => {
                next.status = TaskStatus::Error;
                next.error = Some(error);
                next.status_message = None;
                next.completed_at = Some(Utc::now());
            }
        }
        *task = next;
        true
    }

    pub fn get(&self, id: TaskId) -> Option<&GenerationTask<T>> {
        self.tasks.get(&id)
    }

    /// Tasks in creation order.
    pub fn snapshot(&self) -> Vec<GenerationTask<T>> {
        self.order
            .iter()
            .filter_map(|id| self.tasks.get(id).cloned())
            .collect()
    }

    pub fn all_terminal(&self) -> bool {
        self.tasks.values().all(|t| t.status.is_terminal())
    }

    pub fn active_count(&self) -> usize {
        self.tasks.values().filter(|t| t.status.is_active()).count()
    }
}

impl<T: Clone> Default for TaskBoard<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedBoard<T> = Arc<Mutex<TaskBoard<T>>>;

pub fn shared_board<T: Clone>() -> SharedBoard<T> {
    Arc::new(Mutex::new(TaskBoard::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch_of(n: usize) -> TaskBatch<String> {
        let prompts: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
        TaskBatch::from_prompts(&prompts, 1)
    }

    #[test]
    fn test_apply_replaces_only_addressed_task() {
        let mut board = TaskBoard::new();
        let batch = batch_of(3);
        let ids: Vec<TaskId> = batch.tasks.iter().map(|t| t.id).collect();
        let token = board.begin_batch(batch);

        assert!(board.apply(token, ids[1], TaskUpdate::Failed("boom".into())));

        let snapshot = board.snapshot();
        assert_eq!(snapshot[0].status, TaskStatus::Pending);
        assert_eq!(snapshot[1].status, TaskStatus::Error);
        assert_eq!(snapshot[1].error.as_deref(), Some("boom"));
        assert_eq!(snapshot[2].status, TaskStatus::Pending);
    }

    #[test]
    fn test_stale_token_is_dropped() {
        let mut board = TaskBoard::new();
        let old_batch = batch_of(1);
        let old_id = old_batch.tasks[0].id;
        let old_token = board.begin_batch(old_batch);

        let new_batch = batch_of(1);
        let new_id = new_batch.tasks[0].id;
        board.begin_batch(new_batch);

        // Late completion from the superseded batch must not merge.
        assert!(!board.apply(old_token, old_id, TaskUpdate::Done("late".into())));
        let snapshot = board.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, new_id);
        assert_eq!(snapshot[0].status, TaskStatus::Pending);
    }

    #[test]
    fn test_terminal_states_are_sticky() {
        let mut board = TaskBoard::new();
        let batch = batch_of(1);
        let id = batch.tasks[0].id;
        let token = board.begin_batch(batch);

        assert!(board.apply(token, id, TaskUpdate::Done("ok".into())));
        assert!(!board.apply(
            token,
            id,
            TaskUpdate::Progress {
                status: TaskStatus::Generating,
                message: None
            }
        ));
        assert_eq!(board.get(id).unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn test_snapshot_preserves_creation_order() {
        let mut board = TaskBoard::new();
        let batch = batch_of(5);
        let prompts: Vec<String> = batch.tasks.iter().map(|t| t.input_prompt.clone()).collect();
        board.begin_batch(batch);
        let snapshot_prompts: Vec<String> =
            board.snapshot().iter().map(|t| t.input_prompt.clone()).collect();
        assert_eq!(snapshot_prompts, prompts);
    }

    #[test]
    fn test_progress_message_is_replaced_not_merged() {
        let mut board = TaskBoard::new();
        let batch = batch_of(1);
        let id = batch.tasks[0].id;
        let token = board.begin_batch(batch);

        board.apply(
            token,
            id,
            TaskUpdate::Progress {
                status: TaskStatus::Polling,
                message: Some("đang tạo...".into()),
            },
        );
        board.apply(
            token,
            id,
            TaskUpdate::Progress {
                status: TaskStatus::Polling,
                message: None,
            },
        );
        assert!(board.get(id).unwrap().status_message.is_none());
    }
}
