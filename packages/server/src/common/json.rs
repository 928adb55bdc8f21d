//! Helpers for loosely-typed JSON request bodies.

use serde_json::Value;

use super::error::ApiError;

/// Parse a raw request body as JSON.
pub fn parse_body(raw: &[u8]) -> Result<Value, ApiError> {
    serde_json::from_slice(raw)
        .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))
}

/// Whether a JSON value counts as provided.
///
/// Follows the dashboard's truthiness rule: `null`, `false`, `0` and `""`
/// all count as missing.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Fetch `field` from an object body if it is present.
pub fn field<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|v| is_present(v))
}
