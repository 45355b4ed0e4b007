use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque task identifier. Assigned once at creation, never reused;
/// resubmitting work always creates a task with a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifies one user-triggered generation. Completions carrying a token
/// other than the board's current one are dropped as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchToken(Uuid);

impl BatchToken {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BatchToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Generating,
    Polling,
    Done,
    Error,
}

impl TaskStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Generating | Self::Polling)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

/// One unit of generation work: one prompt in, one output out.
///
/// `result` is present only when `status == Done`; `error` only when
/// `status == Error`. Status transitions are monotonic; a task never leaves
/// a terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationTask<T> {
    pub id: TaskId,
    pub input_prompt: String,
    pub status: TaskStatus,
    pub result: Option<T>,
    pub error: Option<String>,
    pub status_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl<T> GenerationTask<T> {
    pub fn new(input_prompt: impl Into<String>) -> Self {
        Self {
            id: TaskId::new(),
            input_prompt: input_prompt.into(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
            status_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Ordered task list created atomically from one generation action.
///
/// Expansion is the Cartesian product of (prompt list × copies-per-prompt),
/// so N prompts at M copies always yields exactly N*M tasks.
#[derive(Debug, Clone)]
pub struct TaskBatch<T> {
    pub token: BatchToken,
    pub tasks: Vec<GenerationTask<T>>,
}

impl<T> TaskBatch<T> {
    pub fn from_prompts(prompts: &[String], copies_per_prompt: u32) -> Self {
        let mut tasks = Vec::with_capacity(prompts.len() * copies_per_prompt as usize);
        for prompt in prompts {
            for _ in 0..copies_per_prompt {
                tasks.push(GenerationTask::new(prompt.clone()));
            }
        }
        Self {
            token: BatchToken::new(),
            tasks,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lifecycle_classes() {
        assert!(TaskStatus::Pending.is_active());
        assert!(TaskStatus::Generating.is_active());
        assert!(TaskStatus::Polling.is_active());
        assert!(TaskStatus::Done.is_terminal());
        assert!(TaskStatus::Error.is_terminal());
        assert!(!TaskStatus::Done.is_active());
    }

    #[test]
    fn test_cartesian_expansion_counts_and_ids() {
        let prompts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let batch: TaskBatch<()> = TaskBatch::from_prompts(&prompts, 4);
        assert_eq!(batch.len(), 12);

        let mut ids: Vec<_> = batch.tasks.iter().map(|t| t.id).collect();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), 12, "every task must get a distinct id");

        // Ordering follows the prompt list, copies adjacent.
        assert_eq!(batch.tasks[0].input_prompt, "a");
        assert_eq!(batch.tasks[3].input_prompt, "a");
        assert_eq!(batch.tasks[4].input_prompt, "b");
    }

    #[test]
    fn test_new_task_starts_pending() {
        let task: GenerationTask<()> = GenerationTask::new("prompt");
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.result.is_none());
        assert!(task.error.is_none());
        assert!(task.completed_at.is_none());
    }
}
