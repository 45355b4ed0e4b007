use tokio::sync::mpsc::UnboundedSender;

use mf_core::{BatchToken, TaskId};

/// Incremental task notifications for whoever renders the board.
#[derive(Debug, Clone)]
pub enum StudioEvent {
    TaskQueued {
        token: BatchToken,
        id: TaskId,
    },
    TaskProgress {
        token: BatchToken,
        id: TaskId,
        message: String,
    },
    TaskDone {
        token: BatchToken,
        id: TaskId,
    },
    TaskFailed {
        token: BatchToken,
        id: TaskId,
        error: String,
    },
    BatchFinished {
        token: BatchToken,
    },
}

/// Best-effort event emitter. A missing or dropped receiver never fails the
/// task that emitted.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<StudioEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<StudioEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: StudioEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
