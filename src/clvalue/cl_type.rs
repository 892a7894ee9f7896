//! CLType: the declared type of a typed value

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

use super::bytesrepr::{write_u32, ByteReader};
use super::CLValueError;

/// Nesting limit when parsing types from untrusted JSON
pub const MAX_TYPE_DEPTH: usize = 50;

/// All supported value types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CLType {
    Bool,
    I32,
    I64,
    U8,
    U32,
    U64,
    U128,
    U256,
    U512,
    Unit,
    String,
    Key,
    URef,
    PublicKey,
    Any,
    Option(Box<CLType>),
    List(Box<CLType>),
    ByteArray(u32),
    Result { ok: Box<CLType>, err: Box<CLType> },
    Map { key: Box<CLType>, value: Box<CLType> },
    Tuple1(Box<CLType>),
    Tuple2(Box<CLType>, Box<CLType>),
    Tuple3(Box<CLType>, Box<CLType>, Box<CLType>),
}

impl CLType {
    pub fn option(inner: CLType) -> Self {
        CLType::Option(Box::new(inner))
    }

    pub fn list(inner: CLType) -> Self {
        CLType::List(Box::new(inner))
    }

    pub fn result(ok: CLType, err: CLType) -> Self {
        CLType::Result { ok: Box::new(ok), err: Box::new(err) }
    }

    pub fn map(key: CLType, value: CLType) -> Self {
        CLType::Map { key: Box::new(key), value: Box::new(value) }
    }

    /// Parse the JSON form (`"U512"`, `{"List": "U8"}`, `{"ByteArray": 32}`, ...)
    pub fn from_json(value: &Value) -> Result<Self, CLValueError> {
        Self::from_json_at_depth(value, 0)
    }

    fn from_json_at_depth(value: &Value, depth: usize) -> Result<Self, CLValueError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(CLValueError::InvalidType("type nesting too deep".to_string()));
        }
        let nested = |v: &Value| Self::from_json_at_depth(v, depth + 1).map(Box::new);

        match value {
            Value::String(name) => match name.as_str() {
                "Bool" => Ok(CLType::Bool),
                "I32" => Ok(CLType::I32),
                "I64" => Ok(CLType::I64),
                "U8" => Ok(CLType::U8),
                "U32" => Ok(CLType::U32),
                "U64" => Ok(CLType::U64),
                "U128" => Ok(CLType::U128),
                "U256" => Ok(CLType::U256),
                "U512" => Ok(CLType::U512),
                "Unit" => Ok(CLType::Unit),
                "String" => Ok(CLType::String),
                "Key" => Ok(CLType::Key),
                "URef" => Ok(CLType::URef),
                "PublicKey" => Ok(CLType::PublicKey),
                "Any" => Ok(CLType::Any),
                other => Err(CLValueError::InvalidType(format!("unknown type: {}", other))),
            },
            Value::Object(map) if map.len() == 1 => {
                let (name, inner) = map
                    .iter()
                    .next()
                    .ok_or_else(|| CLValueError::InvalidType("empty type object".to_string()))?;
                match name.as_str() {
                    "Option" => Ok(CLType::Option(nested(inner)?)),
                    "List" => Ok(CLType::List(nested(inner)?)),
                    "ByteArray" => inner
                        .as_u64()
                        .and_then(|n| u32::try_from(n).ok())
                        .map(CLType::ByteArray)
                        .ok_or_else(|| CLValueError::InvalidType("ByteArray length must be a u32".to_string())),
                    "Result" => Ok(CLType::Result {
                        ok: nested(field(inner, "ok")?)?,
                        err: nested(field(inner, "err")?)?,
                    }),
                    "Map" => Ok(CLType::Map {
                        key: nested(field(inner, "key")?)?,
                        value: nested(field(inner, "value")?)?,
                    }),
                    "Tuple1" | "Tuple2" | "Tuple3" => {
                        let items = inner
                            .as_array()
                            .ok_or_else(|| CLValueError::InvalidType(format!("{} expects an array", name)))?;
                        match (name.as_str(), items.as_slice()) {
                            ("Tuple1", [a]) => Ok(CLType::Tuple1(nested(a)?)),
                            ("Tuple2", [a, b]) => Ok(CLType::Tuple2(nested(a)?, nested(b)?)),
                            ("Tuple3", [a, b, c]) => Ok(CLType::Tuple3(nested(a)?, nested(b)?, nested(c)?)),
                            _ => Err(CLValueError::InvalidType(format!(
                                "{} has wrong arity {}",
                                name,
                                items.len()
                            ))),
                        }
                    }
                    other => Err(CLValueError::InvalidType(format!("unknown type: {}", other))),
                }
            }
            other => Err(CLValueError::InvalidType(format!("unrecognised type json: {}", other))),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CLType::Option(inner) => json!({ "Option": inner.to_json() }),
            CLType::List(inner) => json!({ "List": inner.to_json() }),
            CLType::ByteArray(len) => json!({ "ByteArray": len }),
            CLType::Result { ok, err } => json!({ "Result": { "ok": ok.to_json(), "err": err.to_json() } }),
            CLType::Map { key, value } => json!({ "Map": { "key": key.to_json(), "value": value.to_json() } }),
            CLType::Tuple1(a) => json!({ "Tuple1": [a.to_json()] }),
            CLType::Tuple2(a, b) => json!({ "Tuple2": [a.to_json(), b.to_json()] }),
            CLType::Tuple3(a, b, c) => json!({ "Tuple3": [a.to_json(), b.to_json(), c.to_json()] }),
            simple => Value::String(simple.simple_name().to_string()),
        }
    }

    fn simple_name(&self) -> &'static str {
        match self {
            CLType::Bool => "Bool",
            CLType::I32 => "I32",
            CLType::I64 => "I64",
            CLType::U8 => "U8",
            CLType::U32 => "U32",
            CLType::U64 => "U64",
            CLType::U128 => "U128",
            CLType::U256 => "U256",
            CLType::U512 => "U512",
            CLType::Unit => "Unit",
            CLType::String => "String",
            CLType::Key => "Key",
            CLType::URef => "URef",
            CLType::PublicKey => "PublicKey",
            CLType::Any => "Any",
            CLType::Option(_) => "Option",
            CLType::List(_) => "List",
            CLType::ByteArray(_) => "ByteArray",
            CLType::Result { .. } => "Result",
            CLType::Map { .. } => "Map",
            CLType::Tuple1(_) => "Tuple1",
            CLType::Tuple2(..) => "Tuple2",
            CLType::Tuple3(..) => "Tuple3",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            CLType::Bool => 0,
            CLType::I32 => 1,
            CLType::I64 => 2,
            CLType::U8 => 3,
            CLType::U32 => 4,
            CLType::U64 => 5,
            CLType::U128 => 6,
            CLType::U256 => 7,
            CLType::U512 => 8,
            CLType::Unit => 9,
            CLType::String => 10,
            CLType::Key => 11,
            CLType::URef => 12,
            CLType::Option(_) => 13,
            CLType::List(_) => 14,
            CLType::ByteArray(_) => 15,
            CLType::Result { .. } => 16,
            CLType::Map { .. } => 17,
            CLType::Tuple1(_) => 18,
            CLType::Tuple2(..) => 19,
            CLType::Tuple3(..) => 20,
            CLType::Any => 21,
            CLType::PublicKey => 22,
        }
    }

    /// Byte form appended after every serialized value
    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(self.tag());
        match self {
            CLType::Option(inner) | CLType::List(inner) | CLType::Tuple1(inner) => inner.write(out),
            CLType::ByteArray(len) => write_u32(out, *len),
            CLType::Result { ok, err } => {
                ok.write(out);
                err.write(out);
            }
            CLType::Map { key, value } => {
                key.write(out);
                value.write(out);
            }
            CLType::Tuple2(a, b) => {
                a.write(out);
                b.write(out);
            }
            CLType::Tuple3(a, b, c) => {
                a.write(out);
                b.write(out);
                c.write(out);
            }
            _ => {}
        }
    }

    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, CLValueError> {
        Self::read_at_depth(reader, 0)
    }

    fn read_at_depth(reader: &mut ByteReader<'_>, depth: usize) -> Result<Self, CLValueError> {
        if depth > MAX_TYPE_DEPTH {
            return Err(CLValueError::InvalidType("type nesting too deep".to_string()));
        }
        let next = depth + 1;
        let ty = match reader.u8()? {
            0 => CLType::Bool,
            1 => CLType::I32,
            2 => CLType::I64,
            3 => CLType::U8,
            4 => CLType::U32,
            5 => CLType::U64,
            6 => CLType::U128,
            7 => CLType::U256,
            8 => CLType::U512,
            9 => CLType::Unit,
            10 => CLType::String,
            11 => CLType::Key,
            12 => CLType::URef,
            13 => CLType::Option(Self::read_boxed(reader, next)?),
            14 => CLType::List(Self::read_boxed(reader, next)?),
            15 => CLType::ByteArray(reader.u32()?),
            16 => {
                let ok = Self::read_boxed(reader, next)?;
                let err = Self::read_boxed(reader, next)?;
                CLType::Result { ok, err }
            }
            17 => {
                let key = Self::read_boxed(reader, next)?;
                let value = Self::read_boxed(reader, next)?;
                CLType::Map { key, value }
            }
            18 => CLType::Tuple1(Self::read_boxed(reader, next)?),
            19 => {
                let a = Self::read_boxed(reader, next)?;
                let b = Self::read_boxed(reader, next)?;
                CLType::Tuple2(a, b)
            }
            20 => {
                let a = Self::read_boxed(reader, next)?;
                let b = Self::read_boxed(reader, next)?;
                let c = Self::read_boxed(reader, next)?;
                CLType::Tuple3(a, b, c)
            }
            21 => CLType::Any,
            22 => CLType::PublicKey,
            tag => return Err(CLValueError::InvalidType(format!("unknown type tag {}", tag))),
        };
        Ok(ty)
    }

    fn read_boxed(reader: &mut ByteReader<'_>, depth: usize) -> Result<Box<Self>, CLValueError> {
        Self::read_at_depth(reader, depth).map(Box::new)
    }
}

fn field<'a>(value: &'a Value, name: &str) -> Result<&'a Value, CLValueError> {
    value
        .get(name)
        .ok_or_else(|| CLValueError::InvalidType(format!("missing '{}' in type", name)))
}

/// Display names used in review screens: `U64`, `List<U8>`, `ByteArray[32]`
impl fmt::Display for CLType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLType::Option(inner) => write!(f, "Option<{}>", inner),
            CLType::List(inner) => write!(f, "List<{}>", inner),
            CLType::ByteArray(len) => write!(f, "ByteArray[{}]", len),
            CLType::Result { ok, err } => write!(f, "Result<{}, {}>", ok, err),
            CLType::Map { key, value } => write!(f, "Map<{}, {}>", key, value),
            CLType::Tuple1(a) => write!(f, "Tuple1<{}>", a),
            CLType::Tuple2(a, b) => write!(f, "Tuple2<{}, {}>", a, b),
            CLType::Tuple3(a, b, c) => write!(f, "Tuple3<{}, {}, {}>", a, b, c),
            simple => f.write_str(simple.simple_name()),
        }
    }
}

impl Serialize for CLType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CLType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        CLType::from_json(&value).map_err(serde::de::Error::custom)
    }
}
