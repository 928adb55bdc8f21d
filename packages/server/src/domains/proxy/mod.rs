//! Proxy domain - thin forwarders to the fixed external analytics APIs.

pub mod actions;
pub mod canned;

pub use actions::*;
