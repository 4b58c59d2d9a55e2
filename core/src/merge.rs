//! Best-effort JSON object parsing and payload merging.
//!
//! Malformed input never fails a request: it degrades to an empty object and
//! is reported through `tracing` instead. Callers that need the parse error
//! itself can use [`try_parse_object`].

use serde_json::{Map, Value};
use tracing::{error, warn};

/// Parse `text` as a JSON object, returning the parser error on failure.
///
/// Arrays, scalars and `null` are rejected; only objects map to a key/value
/// tree.
pub fn try_parse_object(text: &str) -> Result<Map<String, Value>, serde_json::Error> {
    serde_json::from_str(text.trim())
}

/// Parse `text` as a JSON object, degrading to an empty map.
///
/// Blank input is logged at `warn`, malformed input at `error`.
pub fn parse_object(text: &str) -> Map<String, Value> {
    if text.trim().is_empty() {
        warn!("JSON text was blank, using an empty object");
        return Map::new();
    }
    match try_parse_object(text) {
        Ok(map) => map,
        Err(e) => {
            error!(error = %e, json = text, "failed converting JSON to an object");
            Map::new()
        }
    }
}

/// Overlay `data` onto the object parsed from `raw_json`. Entries in `data`
/// win on key collision.
pub fn merge(raw_json: &str, data: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = if raw_json.trim().is_empty() {
        Map::new()
    } else {
        parse_object(raw_json)
    };
    for (key, value) in data {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// [`merge`], serialized to JSON text.
pub fn merge_to_string(raw_json: &str, data: &Map<String, Value>) -> String {
    Value::Object(merge(raw_json, data)).to_string()
}
