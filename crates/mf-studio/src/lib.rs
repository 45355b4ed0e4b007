pub mod board;
pub mod config;
pub mod events;
pub mod logging;
pub mod orchestrator;
pub mod session;
pub mod tools;

pub use board::{shared_board, SharedBoard, TaskBoard, TaskUpdate};
pub use config::StudioConfig;
pub use events::{EventSink, StudioEvent};
pub use orchestrator::{BatchRunner, TaskHandle, TaskSeed};
pub use session::CredentialGate;
