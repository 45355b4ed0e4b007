//! Batch execution over a shared task board.
//!
//! A runner is bound to one batch token. Tools provide the per-task future;
//! the runner owns the terminal transition, so a task's failure is recorded
//! on that task alone and never aborts its siblings. After either entry
//! point returns, every task in the batch is in a terminal state.

use std::future::Future;

use futures::future::join_all;

use mf_core::{BatchToken, Result, TaskBatch, TaskId, TaskStatus};

use crate::board::{SharedBoard, TaskUpdate};
use crate::events::{EventSink, StudioEvent};

/// What a tool needs to execute one task: the id, the resolved prompt, and
/// the task's position in the batch (used as a variation seed).
#[derive(Debug, Clone)]
pub struct TaskSeed {
    pub id: TaskId,
    pub prompt: String,
    pub index: usize,
}

pub struct BatchRunner<T> {
    board: SharedBoard<T>,
    events: EventSink,
    token: BatchToken,
}

impl<T: Clone> BatchRunner<T> {
    /// Expand (prompts × copies) into a fresh batch and install it on the
    /// board, replacing whatever batch was there.
    pub fn begin(
        board: SharedBoard<T>,
        events: EventSink,
        prompts: &[String],
        copies_per_prompt: u32,
    ) -> (Self, Vec<TaskSeed>) {
        Self::begin_with_batch(board, events, TaskBatch::from_prompts(prompts, copies_per_prompt))
    }

    pub fn begin_with_batch(
        board: SharedBoard<T>,
        events: EventSink,
        batch: TaskBatch<T>,
    ) -> (Self, Vec<TaskSeed>) {
        let seeds: Vec<TaskSeed> = batch
            .tasks
            .iter()
            .enumerate()
            .map(|(index, task)| TaskSeed {
                id: task.id,
                prompt: task.input_prompt.clone(),
                index,
            })
            .collect();
        let token = board.lock().unwrap().begin_batch(batch);
        for seed in &seeds {
            events.emit(StudioEvent::TaskQueued { token, id: seed.id });
        }
        (
            Self {
                board,
                events,
                token,
            },
            seeds,
        )
    }

    pub fn token(&self) -> BatchToken {
        self.token
    }

    pub fn handle(&self, id: TaskId) -> TaskHandle<T> {
        TaskHandle {
            board: self.board.clone(),
            events: self.events.clone(),
            token: self.token,
            id,
        }
    }

    /// Await each task to a terminal state before starting the next. Used
    /// where the API is rate-sensitive or result ordering matters.
    pub async fn run_sequential<F, Fut>(&self, seeds: Vec<TaskSeed>, run: F)
    where
        F: Fn(TaskHandle<T>, TaskSeed) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        for seed in seeds {
            self.drive(seed, &run).await;
        }
        self.events
            .emit(StudioEvent::BatchFinished { token: self.token });
    }

    /// Launch every task at once and join on all of them. Used where tasks
    /// are independent single calls.
    pub async fn run_parallel<F, Fut>(&self, seeds: Vec<TaskSeed>, run: F)
    where
        F: Fn(TaskHandle<T>, TaskSeed) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        join_all(seeds.into_iter().map(|seed| self.drive(seed, &run))).await;
        self.events
            .emit(StudioEvent::BatchFinished { token: self.token });
    }

    async fn drive<F, Fut>(&self, seed: TaskSeed, run: &F)
    where
        F: Fn(TaskHandle<T>, TaskSeed) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let id = seed.id;
        match run(self.handle(id), seed).await {
            Ok(result) => {
                self.apply(id, TaskUpdate::Done(result));
                self.events.emit(StudioEvent::TaskDone {
                    token: self.token,
                    id,
                });
            }
            Err(error) => {
                tracing::warn!(%id, %error, "generation task failed");
                let message = error.user_message();
                self.apply(id, TaskUpdate::Failed(message.clone()));
                self.events.emit(StudioEvent::TaskFailed {
                    token: self.token,
                    id,
                    error: message,
                });
            }
        }
    }

    fn apply(&self, id: TaskId, update: TaskUpdate<T>) {
        self.board.lock().unwrap().apply(self.token, id, update);
    }
}

/// Lets a running task publish its own progress.
#[derive(Debug)]
pub struct TaskHandle<T> {
    board: SharedBoard<T>,
    events: EventSink,
    token: BatchToken,
    id: TaskId,
}

impl<T> Clone for TaskHandle<T> {
    fn clone(&self) -> Self {
        Self {
            board: self.board.clone(),
            events: self.events.clone(),
            token: self.token,
            id: self.id,
        }
    }
}

impl<T: Clone> TaskHandle<T> {
    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn progress(&self, status: TaskStatus, message: impl Into<String>) {
        let message = message.into();
        self.board.lock().unwrap().apply(
            self.token,
            self.id,
            TaskUpdate::Progress {
                status,
                message: Some(message.clone()),
            },
        );
        self.events.emit(StudioEvent::TaskProgress {
            token: self.token,
            id: self.id,
            message,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::shared_board;
    use mf_core::Error;
    use std::cell::RefCell;
    use std::sync::Arc;

    fn prompts(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("p{i}")).collect()
    }

    #[tokio::test]
    async fn test_parallel_failure_is_isolated() {
        let board = shared_board::<String>();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let (runner, seeds) =
            BatchRunner::begin(board.clone(), EventSink::new(tx), &prompts(4), 1);

        runner
            .run_parallel(seeds, |handle, seed| async move {
                handle.progress(TaskStatus::Generating, "đang tạo...");
                if seed.index == 2 {
                    Err(Error::ServiceUnavailable("503".into()))
                } else {
                    Ok(format!("out-{}", seed.index))
                }
            })
            .await;

        let snapshot = board.lock().unwrap().snapshot();
        assert!(board.lock().unwrap().all_terminal());
        assert_eq!(snapshot[2].status, TaskStatus::Error);
        assert!(snapshot[2].error.as_deref().unwrap().contains("quá tải"));
        for i in [0usize, 1, 3] {
            assert_eq!(snapshot[i].status, TaskStatus::Done);
            assert_eq!(snapshot[i].result.as_deref(), Some(format!("out-{i}").as_str()));
        }

        let mut done = 0;
        let mut failed = 0;
        let mut finished = 0;
        while let Ok(event) = rx.try_recv() {
            match event {
                StudioEvent::TaskDone { .. } => done += 1,
                StudioEvent::TaskFailed { .. } => failed += 1,
                StudioEvent::BatchFinished { .. } => finished += 1,
                _ => {}
            }
        }
        assert_eq!((done, failed, finished), (3, 1, 1));
    }

    #[tokio::test]
    async fn test_sequential_waits_for_terminal_state() {
        let board = shared_board::<usize>();
        let (runner, seeds) =
            BatchRunner::begin(board.clone(), EventSink::disabled(), &prompts(3), 1);
        let starts = RefCell::new(Vec::new());

        let board_probe = board.clone();
        runner
            .run_sequential(seeds, |_handle, seed| {
                // Every earlier task must already be terminal when a new one
                // starts.
                let active = board_probe.lock().unwrap().active_count();
                starts.borrow_mut().push((seed.index, active));
                async move { Ok(seed.index) }
            })
            .await;

        let starts = starts.into_inner();
        assert_eq!(
            starts,
            vec![(0, 3), (1, 2), (2, 1)],
            "exactly one batch-slot drains before each next start"
        );
    }

    #[tokio::test]
    async fn test_parallel_actually_fans_out() {
        let board = shared_board::<usize>();
        let (runner, seeds) =
            BatchRunner::begin(board.clone(), EventSink::disabled(), &prompts(4), 1);
        // A barrier with all participants only clears if every task future
        // is in flight at once; a sequential runner would deadlock here.
        let barrier = Arc::new(tokio::sync::Barrier::new(4));

        runner
            .run_parallel(seeds, |_handle, seed| {
                let barrier = barrier.clone();
                async move {
                    barrier.wait().await;
                    Ok(seed.index)
                }
            })
            .await;

        assert!(board.lock().unwrap().all_terminal());
    }

    #[tokio::test]
    async fn test_superseded_batch_results_are_dropped() {
        let board = shared_board::<String>();
        let (old_runner, old_seeds) =
            BatchRunner::begin(board.clone(), EventSink::disabled(), &prompts(1), 1);

        // A new generation replaces the batch while the old one is in flight.
        let (_new_runner, new_seeds) =
            BatchRunner::begin(board.clone(), EventSink::disabled(), &prompts(1), 1);

        old_runner
            .run_sequential(old_seeds, |_handle, _seed| async move {
                Ok("late result".to_string())
            })
            .await;

        let snapshot = board.lock().unwrap().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, new_seeds[0].id);
        assert_eq!(snapshot[0].status, TaskStatus::Pending);
        assert!(snapshot[0].result.is_none());
    }

    #[tokio::test]
    async fn test_cartesian_seed_expansion() {
        let board = shared_board::<usize>();
        let (_runner, seeds) = BatchRunner::begin(
            board.clone(),
            EventSink::disabled(),
            &prompts(3),
            4,
        );
        assert_eq!(seeds.len(), 12);
        let board = board.lock().unwrap();
        assert_eq!(board.snapshot().len(), 12);
    }
}
