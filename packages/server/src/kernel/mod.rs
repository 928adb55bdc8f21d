//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{HttpUpstream, InferenceAdapter, KnowledgeAdapter, ServerDeps};
pub use test_dependencies::{
    MemorySink, MockInferenceStream, MockKnowledgeService, MockUpstreamApi, TestDependencies,
};
pub use traits::*;
