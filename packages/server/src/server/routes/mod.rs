// HTTP routes
pub mod chat;
pub mod health;
pub mod proxy;

pub use chat::*;
pub use health::*;
pub use proxy::*;
