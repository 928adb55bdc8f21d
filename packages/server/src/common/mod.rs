// Common types and utilities shared across the application

pub mod error;
pub mod json;

pub use error::ApiError;
