// Proxy actions - validate, forward, relay
pub mod knowledge_hub;
pub mod predict_insight;
pub mod transaction_chain;

pub use knowledge_hub::*;
pub use predict_insight::*;
pub use transaction_chain::*;
