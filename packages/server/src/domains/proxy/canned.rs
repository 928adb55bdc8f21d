//! Canned transaction-chain analyses served for exact prompt matches.

use chrono::{SecondsFormat, Utc};
use lazy_static::lazy_static;
use serde_json::Value;
use std::collections::HashMap;

lazy_static! {
    static ref CANNED_ANALYSES: HashMap<String, Value> =
        serde_json::from_str(include_str!("../../../data/transaction_chain_canned.json"))
            .expect("embedded transaction chain analyses are valid JSON");
}

/// The canned analysis for `prompt`, stamped with the current time.
///
/// Matching is exact after trimming surrounding whitespace.
pub fn canned_analysis(prompt: &str) -> Option<Value> {
    let mut analysis = CANNED_ANALYSES.get(prompt.trim())?.clone();
    analysis["timestamp"] = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    Some(analysis)
}
