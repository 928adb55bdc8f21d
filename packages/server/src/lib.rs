// Audit Analytics - API Core
//
// Backend for the audit analytics dashboard: the knowledge-backed chat stream
// and the proxies to the external analytics APIs.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
pub use kernel::ServerDeps;
