//! Named runtime arguments: `[[name, CLValue], ...]`

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::clvalue::bytesrepr::{write_string, write_u32};
use crate::clvalue::CLValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedArg(pub String, pub CLValue);

/// Ordered argument list; declaration order is significant for hashing and display
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeArgs(Vec<NamedArg>);

impl RuntimeArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append, or replace a same-named argument in place
    pub fn insert(&mut self, name: impl Into<String>, value: CLValue) {
        let name = name.into();
        match self.0.iter_mut().find(|arg| arg.0 == name) {
            Some(arg) => arg.1 = value,
            None => self.0.push(NamedArg(name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: CLValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&CLValue> {
        self.0.iter().find(|arg| arg.0 == name).map(|arg| &arg.1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CLValue)> {
        self.0.iter().map(|arg| (arg.0.as_str(), &arg.1))
    }

    /// First name declared more than once
    pub fn duplicate_name(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.0.iter().map(|arg| arg.0.as_str()).find(|name| !seen.insert(*name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        write_u32(out, self.0.len() as u32);
        for NamedArg(name, value) in &self.0 {
            write_string(out, name);
            value.write(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_shape_is_pairs() {
        let args = RuntimeArgs::new().with("amount", CLValue::u512(5)).with("id", CLValue::option_u64(None));
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json[0][0], json!("amount"));
        assert_eq!(json[1][1]["cl_type"], json!({"Option": "U64"}));

        let back: RuntimeArgs = serde_json::from_value(json).unwrap();
        assert_eq!(back, args);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut args = RuntimeArgs::new().with("a", CLValue::u8(1)).with("b", CLValue::u8(2));
        args.insert("a", CLValue::u8(3));
        let names: Vec<_> = args.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(args.get("a"), Some(&CLValue::u8(3)));
    }

    #[test]
    fn test_duplicate_name_is_found() {
        let args = RuntimeArgs::new().with("a", CLValue::u8(1)).with("b", CLValue::u8(2));
        let mut raw = serde_json::to_value(&args).unwrap();
        assert!(serde_json::from_value::<RuntimeArgs>(raw.clone()).unwrap().duplicate_name().is_none());

        raw.as_array_mut().unwrap().push(json!(["a", serde_json::to_value(CLValue::u8(3)).unwrap()]));
        let args: RuntimeArgs = serde_json::from_value(raw).unwrap();
        assert_eq!(args.duplicate_name(), Some("a"));
        // lookups see the first declaration
        assert_eq!(args.get("a"), Some(&CLValue::u8(1)));
    }

    #[test]
    fn test_bytes() {
        let args = RuntimeArgs::new().with("x", CLValue::u8(7));
        let mut out = Vec::new();
        args.write(&mut out);
        // count, name, value len, value, type tag
        assert_eq!(out, vec![1, 0, 0, 0, 1, 0, 0, 0, b'x', 1, 0, 0, 0, 7, 3]);
    }
}
