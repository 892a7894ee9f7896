//! TypedValueFormatter
//!
//! Renders a [`TypedValue`] into a string, or a nested list of strings for
//! collection-shaped values, for the review screen. Formatting is total: every
//! variant has a rendering and nothing here can fail.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::value::TypedValue;

/// Rendering of the unit value
pub const UNIT_MARKER: &str = "Unit";

/// A map with no entries
pub const EMPTY_MAP_MARKER: &str = "{}";

/// A rendered argument: plain text or an ordered list of renderings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayValue {
    Text(String),
    List(Vec<DisplayValue>),
}

impl DisplayValue {
    pub fn text(s: impl Into<String>) -> Self {
        DisplayValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            DisplayValue::Text(s) => Some(s),
            DisplayValue::List(_) => None,
        }
    }
}

/// Flattened single-line form: lists become `[a, b, c]`
impl fmt::Display for DisplayValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayValue::Text(s) => f.write_str(s),
            DisplayValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Typed value renderer
pub struct TypedValueFormatter;

impl TypedValueFormatter {
    pub fn format(value: &TypedValue) -> DisplayValue {
        match value {
            TypedValue::Unit => DisplayValue::text(UNIT_MARKER),
            TypedValue::Key(key) => DisplayValue::Text(key.to_string()),
            TypedValue::URef(uref) => DisplayValue::Text(uref.to_string()),
            TypedValue::Option { inner_type, value } => match value {
                Some(inner) => Self::format(inner),
                None => DisplayValue::Text(format!("<empty> {}", inner_type)),
            },
            TypedValue::List { items, .. } => {
                DisplayValue::List(items.iter().map(Self::format_collapsed).collect())
            }
            TypedValue::ByteArray(bytes) => DisplayValue::Text(hex::encode(bytes)),
            TypedValue::Result { is_ok, value, .. } => {
                let prefix = if *is_ok { "OK:" } else { "ERR:" };
                DisplayValue::Text(format!("{}{}", prefix, Self::format(value)))
            }
            TypedValue::Map { entries, .. } if entries.is_empty() => DisplayValue::text(EMPTY_MAP_MARKER),
            TypedValue::Map { entries, .. } => DisplayValue::Text(
                entries
                    .iter()
                    .map(|(k, v)| format!("{}={}", Self::format(k), Self::format(v)))
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            TypedValue::Tuple1(a) => Self::format(a),
            TypedValue::Tuple2(a, b) => {
                DisplayValue::List(vec![Self::format_collapsed(a), Self::format_collapsed(b)])
            }
            TypedValue::Tuple3(a, b, c) => DisplayValue::List(vec![
                Self::format_collapsed(a),
                Self::format_collapsed(b),
                Self::format_collapsed(c),
            ]),
            TypedValue::PublicKey(key) => {
                DisplayValue::Text(key.map(|k| k.to_hex()).unwrap_or_default())
            }
            TypedValue::AccountHash(hash) => DisplayValue::Text(hash.to_string()),
            other => DisplayValue::Text(generic_string(other)),
        }
    }

    /// Nested lists collapse to `<element-type>[...]`
    fn format_collapsed(value: &TypedValue) -> DisplayValue {
        match value {
            TypedValue::List { element_type, .. } => {
                DisplayValue::Text(format!("{}[...]", element_type))
            }
            other => Self::format(other),
        }
    }
}

fn generic_string(value: &TypedValue) -> String {
    match value {
        TypedValue::Bool(v) => v.to_string(),
        TypedValue::I32(v) => v.to_string(),
        TypedValue::I64(v) => v.to_string(),
        TypedValue::U8(v) => v.to_string(),
        TypedValue::U32(v) => v.to_string(),
        TypedValue::U64(v) => v.to_string(),
        TypedValue::U128(v) | TypedValue::U256(v) | TypedValue::U512(v) => v.to_dec_string(),
        TypedValue::String(s) => s.clone(),
        TypedValue::Any(bytes) => hex::encode(bytes),
        TypedValue::Other(s) => s.clone(),
        _ => format!("{:?}", value),
    }
}
