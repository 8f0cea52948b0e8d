//! Unwrapping of webhook response envelopes.
//!
//! The backend answers through several automation layers, each of which may
//! wrap the payload once more: a JSON document encoded as a string, a
//! one-element array holding `{ "json": "<encoded>" }`, an object with a
//! `json` string field, or a `{ "success": .., "data": .. }` envelope.
//!
//! Rules are tried in this order on every level:
//!
//! 1. string: parse as JSON and recurse; unparsable strings are returned as is
//! 2. `[ { "json": "<encoded>" } ]`: parse the field and recurse
//! 3. `{ "json": "<encoded>" }`: parse the field and recurse
//! 4. object with both `data` and `success` keys: return `data` verbatim
//! 5. anything else: returned as is
//!
//! A `json` field that fails to parse falls through to the next rule, so
//! `{"success":true,"data":1,"json":"x"}` yields `1`, while a parsable
//! `json` field wins over the envelope. Each successful step consumes one
//! layer of encoding, which bounds the recursion by the input size.

use serde_json::{Map, Value};

/// Returns the canonical payload inside `raw`. Never fails.
pub fn unwrap_response(raw: Value) -> Value {
    match raw {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(parsed) => unwrap_response(parsed),
            Err(_) => Value::String(text),
        },
        Value::Array(items) => {
            if let [Value::Object(only)] = items.as_slice() {
                if let Some(parsed) = parse_json_field(only) {
                    return unwrap_response(parsed);
                }
            }
            Value::Array(items)
        }
        Value::Object(mut map) => {
            if let Some(parsed) = parse_json_field(&map) {
                return unwrap_response(parsed);
            }
            if map.contains_key("data") && map.contains_key("success") {
                return map.remove("data").unwrap_or(Value::Null);
            }
            Value::Object(map)
        }
        other => other,
    }
}

/// Parsed `json` string field, if present and valid
fn parse_json_field(map: &Map<String, Value>) -> Option<Value> {
    let encoded = map.get("json")?.as_str()?;
    match serde_json::from_str(encoded) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::debug!("[Unwrap] `json` field is not JSON: {}", e);
            None
        }
    }
}
