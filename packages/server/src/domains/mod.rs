// Business domains
pub mod chat;
pub mod proxy;
