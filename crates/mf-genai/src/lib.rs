pub mod client;
pub mod images;
pub mod openai;
pub mod poll;
pub mod schema;
pub mod speech;
pub mod video;

pub use client::{AspectRatio, Credential, GenAiClient, UserPart};
pub use images::InlineImage;
pub use poll::VideoPoller;
pub use schema::{Schema, SchemaType};
pub use video::OperationHandle;
