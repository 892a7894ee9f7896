//! Typed contract-argument values
//!
//! A `CLValue` travels as JSON (`cl_type`, hex `bytes`, informational
//! `parsed`). The bytes are authoritative: they are decoded per the declared
//! type into a [`TypedValue`], which [`TypedValueFormatter`] renders for
//! review.

pub mod bytesrepr;
pub mod cl_type;
pub mod formatter;
pub mod keys;
pub mod uint;
pub mod value;


use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub use cl_type::CLType;
pub use formatter::{DisplayValue, TypedValueFormatter};
pub use keys::{AccountHash, Key, PublicKey, URef};
pub use uint::WideUint;
pub use value::TypedValue;

use bytesrepr::{write_bytes, ByteReader};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CLValueError {
    #[error("unexpected end of bytes")]
    EarlyEndOfStream,

    #[error("{0} trailing bytes after value")]
    LeftOverBytes(usize),

    #[error("formatting error: {0}")]
    Formatting(String),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid number: {0}")]
    InvalidNumber(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid type: {0}")]
    InvalidType(String),

    #[error("duplicate map key")]
    DuplicateMapKey,

    #[error("value has more elements than its bytes allow")]
    TooManyElements,

    #[error("value cannot be serialized: {0}")]
    NotSerializable(String),

    #[error("integer too wide for its type")]
    Overflow,
}

/// Wire form of a typed argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CLValue {
    pub cl_type: CLType,
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub bytes: Vec<u8>,
    #[serde(default)]
    pub parsed: Value,
}

impl CLValue {
    /// Encode a typed value, filling `parsed` with its JSON rendering
    pub fn from_typed(value: TypedValue) -> Result<Self, CLValueError> {
        let cl_type = value
            .cl_type()
            .ok_or_else(|| CLValueError::NotSerializable("undecoded value".to_string()))?;
        let bytes = value.to_bytes()?;
        Ok(CLValue { cl_type, bytes, parsed: parsed_json(&value) })
    }

    pub fn try_decode(&self) -> Result<TypedValue, CLValueError> {
        TypedValue::from_bytes(&self.cl_type, &self.bytes)
    }

    /// Decode the bytes, degrading to [`TypedValue::Other`] when they do not
    /// match the declared type
    pub fn decode(&self) -> TypedValue {
        match self.try_decode() {
            Ok(value) => value,
            Err(e) => {
                crate::log_warn!(
                    "clvalue",
                    "Argument bytes do not match declared type",
                    cl_type = self.cl_type,
                    error = e
                );
                TypedValue::Other(self.fallback_display())
            }
        }
    }

    fn fallback_display(&self) -> String {
        match &self.parsed {
            Value::Null => hex::encode(&self.bytes),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Canonical bytes: u32-prefixed value bytes followed by type bytes
    pub fn write(&self, out: &mut Vec<u8>) {
        write_bytes(out, &self.bytes);
        self.cl_type.write(out);
    }

    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, CLValueError> {
        let len = reader.u32()? as usize;
        let bytes = reader.take(len)?.to_vec();
        let cl_type = CLType::read(reader)?;
        let parsed = TypedValue::from_bytes(&cl_type, &bytes)
            .map(|v| parsed_json(&v))
            .unwrap_or(Value::Null);
        Ok(CLValue { cl_type, bytes, parsed })
    }

    // ---- typed constructors ------------------------------------------------

    pub fn u512(motes: u64) -> Self {
        Self::infallible(TypedValue::U512(WideUint::from_u64(motes)))
    }

    pub fn u512_dec(motes: &str) -> Result<Self, CLValueError> {
        Self::from_typed(TypedValue::U512(WideUint::from_dec_str(motes)?))
    }

    pub fn u64(value: u64) -> Self {
        Self::infallible(TypedValue::U64(value))
    }

    pub fn u8(value: u8) -> Self {
        Self::infallible(TypedValue::U8(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::infallible(TypedValue::String(value.into()))
    }

    pub fn public_key(key: PublicKey) -> Self {
        Self::infallible(TypedValue::PublicKey(Some(key)))
    }

    pub fn account_hash(hash: AccountHash) -> Self {
        Self::infallible(TypedValue::AccountHash(hash))
    }

    pub fn option_u64(value: Option<u64>) -> Self {
        Self::infallible(TypedValue::Option {
            inner_type: CLType::U64,
            value: value.map(|v| Box::new(TypedValue::U64(v))),
        })
    }

    /// Only for values whose encoding cannot fail (no `Other`, no absent key,
    /// wide ints built from native widths)
    fn infallible(value: TypedValue) -> Self {
        let cl_type = value.cl_type().unwrap_or(CLType::Any);
        let bytes = value.to_bytes().unwrap_or_default();
        CLValue { cl_type, bytes, parsed: parsed_json(&value) }
    }
}

/// Informational JSON rendering carried in `parsed`
pub fn parsed_json(value: &TypedValue) -> Value {
    match value {
        TypedValue::Bool(v) => json!(v),
        TypedValue::I32(v) => json!(v),
        TypedValue::I64(v) => json!(v),
        TypedValue::U8(v) => json!(v),
        TypedValue::U32(v) => json!(v),
        TypedValue::U64(v) => json!(v),
        TypedValue::U128(v) | TypedValue::U256(v) | TypedValue::U512(v) => json!(v.to_dec_string()),
        TypedValue::Unit | TypedValue::Any(_) => Value::Null,
        TypedValue::String(s) | TypedValue::Other(s) => json!(s),
        TypedValue::Key(key) => json!(key.to_string()),
        TypedValue::URef(uref) => json!(uref.to_string()),
        TypedValue::Option { value, .. } => value.as_deref().map(parsed_json).unwrap_or(Value::Null),
        TypedValue::List { items, .. } => Value::Array(items.iter().map(parsed_json).collect()),
        TypedValue::ByteArray(bytes) => json!(hex::encode(bytes)),
        TypedValue::Result { is_ok, value, .. } => {
            if *is_ok {
                json!({ "Ok": parsed_json(value) })
            } else {
                json!({ "Err": parsed_json(value) })
            }
        }
        TypedValue::Map { entries, .. } => Value::Array(
            entries
                .iter()
                .map(|(k, v)| json!({ "key": parsed_json(k), "value": parsed_json(v) }))
                .collect(),
        ),
        TypedValue::Tuple1(a) => json!([parsed_json(a)]),
        TypedValue::Tuple2(a, b) => json!([parsed_json(a), parsed_json(b)]),
        TypedValue::Tuple3(a, b, c) => json!([parsed_json(a), parsed_json(b), parsed_json(c)]),
        TypedValue::PublicKey(key) => key.map(|k| json!(k.to_hex())).unwrap_or(Value::Null),
        TypedValue::AccountHash(hash) => json!(hash.to_string()),
    }
}
