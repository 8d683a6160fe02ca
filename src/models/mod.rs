//! Canonical client-side records.
//!
//! Backend payloads are loosely shaped (legacy field aliases, ids sent as
//! numbers or strings). Each model has a `Raw*` ingestion type that tolerates
//! those variations and converts into the canonical record; nothing outside
//! this module sees the aliases.

pub mod club;
pub mod invitation;
pub mod notification;

pub use self::club::*;
pub use self::invitation::*;
pub use self::notification::*;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Read an entity id sent either as a JSON number or a numeric string.
pub(crate) fn entity_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decode a JSON array element by element.
///
/// Elements that fail to decode are skipped with a warning so one bad
/// record does not hide the rest. A payload that is not an array at all is
/// reported as `AppError::MalformedPayload`.
pub fn decode_list<R, T>(data: Value, what: &str) -> AppResult<Vec<T>>
where
    R: DeserializeOwned,
    T: From<R>,
{
    let items = match data {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(AppError::MalformedPayload(format!(
                "expected a list of {}, got {}",
                what,
                json_kind(&other)
            )))
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<R>(item) {
            Ok(raw) => out.push(T::from(raw)),
            Err(e) => {
                tracing::warn!("Skipping malformed {} at index {}: {}", what, index, e);
            }
        }
    }
    Ok(out)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
