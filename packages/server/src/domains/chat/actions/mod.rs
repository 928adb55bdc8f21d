// Chat actions - resolve, inspect, emit
pub mod emit_chunks;
pub mod inspect_guards;
pub mod relay_tokens;
pub mod resolve_context;
pub mod stream_chat;

pub use emit_chunks::*;
pub use inspect_guards::*;
pub use relay_tokens::*;
pub use resolve_context::*;
pub use stream_chat::*;
