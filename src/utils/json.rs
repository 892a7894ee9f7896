//! JSON Parsing Utilities
//!
//! Lenient field extraction for inbound request parameters.

use crate::error::{SignerError, SignerResult};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse a JSON string into a type
pub fn parse_json<T: DeserializeOwned>(json_str: &str) -> SignerResult<T> {
    serde_json::from_str(json_str)
        .map_err(|e| SignerError::invalid_params(format!("JSON parse error: {}", e)))
}

/// Parse a JSON value from a string
pub fn parse_json_value(json_str: &str) -> SignerResult<Value> {
    parse_json(json_str)
}

/// Extract a string field
pub fn get_json_string(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Extract a signed integer field (number or decimal string)
pub fn get_json_i64(value: &Value, field: &str) -> Option<i64> {
    value.get(field).and_then(|v| {
        if let Some(n) = v.as_i64() {
            Some(n)
        } else if let Some(s) = v.as_str() {
            s.trim().parse().ok()
        } else {
            None
        }
    })
}

/// Return the first of `names` present on an object
pub fn first_field<'a>(value: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|name| value.get(*name))
}

/// Decode hex, tolerating surrounding whitespace and a `0x` prefix
pub fn parse_hex_bytes(hex_str: &str) -> SignerResult<Vec<u8>> {
    let trimmed = hex_str.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(cleaned)
        .map_err(|e| SignerError::invalid_params(format!("Invalid hex '{}': {}", hex_str, e)))
}
