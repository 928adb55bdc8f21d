//! Chat domain - answers questions from the knowledge service as an SSE stream.

pub mod actions;
pub mod error;
pub mod events;
pub mod models;
pub mod transport;

pub use actions::{stream_chat, ChatOutcome, ChatPhase};
pub use error::ChatError;
pub use events::StreamEvent;
pub use models::*;
pub use transport::{ChannelSink, EventWriter, ResponseSink, SinkError};
