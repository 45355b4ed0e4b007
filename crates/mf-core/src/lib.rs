pub mod artifact;
pub mod duration;
pub mod error;
pub mod models;
pub mod naming;
pub mod task;
pub mod watermark;
pub mod wav;

pub use error::{Error, Result};
pub use task::{BatchToken, GenerationTask, TaskBatch, TaskId, TaskStatus};
