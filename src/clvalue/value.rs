//! TypedValue: a decoded, strongly typed argument value

use super::bytesrepr::{write_string, write_u32, ByteReader};
use super::cl_type::CLType;
use super::keys::{AccountHash, Key, PublicKey, URef};
use super::uint::WideUint;
use super::CLValueError;

/// Closed set of value shapes an argument can take
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    U8(u8),
    U32(u32),
    U64(u64),
    U128(WideUint),
    U256(WideUint),
    U512(WideUint),
    Unit,
    String(String),
    Key(Key),
    URef(URef),
    Option {
        inner_type: CLType,
        value: Option<Box<TypedValue>>,
    },
    List {
        element_type: CLType,
        items: Vec<TypedValue>,
    },
    ByteArray(Vec<u8>),
    Result {
        ok_type: CLType,
        err_type: CLType,
        is_ok: bool,
        value: Box<TypedValue>,
    },
    Map {
        key_type: CLType,
        value_type: CLType,
        entries: Vec<(TypedValue, TypedValue)>,
    },
    Tuple1(Box<TypedValue>),
    Tuple2(Box<TypedValue>, Box<TypedValue>),
    Tuple3(Box<TypedValue>, Box<TypedValue>, Box<TypedValue>),
    PublicKey(Option<PublicKey>),
    /// 32-byte account hash carried as `ByteArray[32]` on the wire
    AccountHash(AccountHash),
    Any(Vec<u8>),
    /// Value that could not be decoded; only its display string survives
    Other(String),
}

impl TypedValue {
    /// Decode `bytes` as a value of `cl_type`, requiring every byte be consumed
    pub fn from_bytes(cl_type: &CLType, bytes: &[u8]) -> Result<Self, CLValueError> {
        let mut reader = ByteReader::new(bytes);
        let value = Self::read(&mut reader, cl_type)?;
        reader.finish()?;
        Ok(value)
    }

    pub fn read(reader: &mut ByteReader<'_>, cl_type: &CLType) -> Result<Self, CLValueError> {
        let value = match cl_type {
            CLType::Bool => TypedValue::Bool(reader.bool()?),
            CLType::I32 => TypedValue::I32(reader.i32()?),
            CLType::I64 => TypedValue::I64(reader.i64()?),
            CLType::U8 => TypedValue::U8(reader.u8()?),
            CLType::U32 => TypedValue::U32(reader.u32()?),
            CLType::U64 => TypedValue::U64(reader.u64()?),
            CLType::U128 => TypedValue::U128(WideUint::read(reader, 16)?),
            CLType::U256 => TypedValue::U256(WideUint::read(reader, 32)?),
            CLType::U512 => TypedValue::U512(WideUint::read(reader, 64)?),
            CLType::Unit => TypedValue::Unit,
            CLType::String => TypedValue::String(reader.string()?),
            CLType::Key => TypedValue::Key(Key::read(reader)?),
            CLType::URef => TypedValue::URef(URef::read(reader)?),
            CLType::PublicKey => TypedValue::PublicKey(Some(PublicKey::read(reader)?)),
            CLType::Any => TypedValue::Any(reader.rest().to_vec()),
            CLType::Option(inner) => {
                let value = match reader.u8()? {
                    0 => None,
                    1 => Some(Box::new(Self::read(reader, inner)?)),
                    tag => return Err(CLValueError::Formatting(format!("invalid option tag {}", tag))),
                };
                TypedValue::Option { inner_type: (**inner).clone(), value }
            }
            CLType::List(inner) => {
                let count = reader.u32()? as usize;
                // Every element except Unit occupies at least one byte
                if **inner != CLType::Unit && count > reader.remaining() {
                    return Err(CLValueError::EarlyEndOfStream);
                }
                let mut items = Vec::with_capacity(count.min(reader.remaining()));
                for _ in 0..count {
                    reader.spend_element()?;
                    items.push(Self::read(reader, inner)?);
                }
                TypedValue::List { element_type: (**inner).clone(), items }
            }
            CLType::ByteArray(len) => TypedValue::ByteArray(reader.take(*len as usize)?.to_vec()),
            CLType::Result { ok, err } => {
                let (is_ok, inner) = match reader.u8()? {
                    1 => (true, ok),
                    0 => (false, err),
                    tag => return Err(CLValueError::Formatting(format!("invalid result tag {}", tag))),
                };
                TypedValue::Result {
                    ok_type: (**ok).clone(),
                    err_type: (**err).clone(),
                    is_ok,
                    value: Box::new(Self::read(reader, inner)?),
                }
            }
            CLType::Map { key, value } => {
                let count = reader.u32()? as usize;
                let mut entries: Vec<(TypedValue, TypedValue)> =
                    Vec::with_capacity(count.min(reader.remaining()));
                for _ in 0..count {
                    reader.spend_element()?;
                    let k = Self::read(reader, key)?;
                    if entries.iter().any(|(existing, _)| *existing == k) {
                        return Err(CLValueError::DuplicateMapKey);
                    }
                    let v = Self::read(reader, value)?;
                    entries.push((k, v));
                }
                TypedValue::Map {
                    key_type: (**key).clone(),
                    value_type: (**value).clone(),
                    entries,
                }
            }
            CLType::Tuple1(a) => {
                reader.spend_element()?;
                TypedValue::Tuple1(Box::new(Self::read(reader, a)?))
            }
            CLType::Tuple2(a, b) => {
                reader.spend_element()?;
                let first = Self::read(reader, a)?;
                let second = Self::read(reader, b)?;
                TypedValue::Tuple2(Box::new(first), Box::new(second))
            }
            CLType::Tuple3(a, b, c) => {
                reader.spend_element()?;
                let first = Self::read(reader, a)?;
                let second = Self::read(reader, b)?;
                let third = Self::read(reader, c)?;
                TypedValue::Tuple3(Box::new(first), Box::new(second), Box::new(third))
            }
        };
        Ok(value)
    }

    /// Declared type; `None` for values that failed to decode
    pub fn cl_type(&self) -> Option<CLType> {
        let ty = match self {
            TypedValue::Bool(_) => CLType::Bool,
            TypedValue::I32(_) => CLType::I32,
            TypedValue::I64(_) => CLType::I64,
            TypedValue::U8(_) => CLType::U8,
            TypedValue::U32(_) => CLType::U32,
            TypedValue::U64(_) => CLType::U64,
            TypedValue::U128(_) => CLType::U128,
            TypedValue::U256(_) => CLType::U256,
            TypedValue::U512(_) => CLType::U512,
            TypedValue::Unit => CLType::Unit,
            TypedValue::String(_) => CLType::String,
            TypedValue::Key(_) => CLType::Key,
            TypedValue::URef(_) => CLType::URef,
            TypedValue::Option { inner_type, .. } => CLType::option(inner_type.clone()),
            TypedValue::List { element_type, .. } => CLType::list(element_type.clone()),
            TypedValue::ByteArray(bytes) => CLType::ByteArray(bytes.len() as u32),
            TypedValue::Result { ok_type, err_type, .. } => CLType::result(ok_type.clone(), err_type.clone()),
            TypedValue::Map { key_type, value_type, .. } => CLType::map(key_type.clone(), value_type.clone()),
            TypedValue::Tuple1(a) => CLType::Tuple1(Box::new(a.cl_type()?)),
            TypedValue::Tuple2(a, b) => CLType::Tuple2(Box::new(a.cl_type()?), Box::new(b.cl_type()?)),
            TypedValue::Tuple3(a, b, c) => CLType::Tuple3(
                Box::new(a.cl_type()?),
                Box::new(b.cl_type()?),
                Box::new(c.cl_type()?),
            ),
            TypedValue::PublicKey(_) => CLType::PublicKey,
            TypedValue::AccountHash(_) => CLType::ByteArray(32),
            TypedValue::Any(_) => CLType::Any,
            TypedValue::Other(_) => return None,
        };
        Some(ty)
    }

    /// Serialize the value bytes (type bytes are not included)
    pub fn to_bytes(&self) -> Result<Vec<u8>, CLValueError> {
        let mut out = Vec::new();
        self.write(&mut out)?;
        Ok(out)
    }

    fn write(&self, out: &mut Vec<u8>) -> Result<(), CLValueError> {
        match self {
            TypedValue::Bool(v) => out.push(*v as u8),
            TypedValue::I32(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::I64(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::U8(v) => out.push(*v),
            TypedValue::U32(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::U64(v) => out.extend_from_slice(&v.to_le_bytes()),
            TypedValue::U128(v) => write_wide(out, v, 16)?,
            TypedValue::U256(v) => write_wide(out, v, 32)?,
            TypedValue::U512(v) => write_wide(out, v, 64)?,
            TypedValue::Unit => {}
            TypedValue::String(s) => write_string(out, s),
            TypedValue::Key(key) => key.write(out),
            TypedValue::URef(uref) => uref.write(out),
            TypedValue::Option { value, .. } => match value {
                None => out.push(0),
                Some(inner) => {
                    out.push(1);
                    inner.write(out)?;
                }
            },
            TypedValue::List { items, .. } => {
                write_u32(out, items.len() as u32);
                for item in items {
                    item.write(out)?;
                }
            }
            TypedValue::ByteArray(bytes) => out.extend_from_slice(bytes),
            TypedValue::Result { is_ok, value, .. } => {
                out.push(*is_ok as u8);
                value.write(out)?;
            }
            TypedValue::Map { entries, .. } => {
                write_u32(out, entries.len() as u32);
                for (k, v) in entries {
                    k.write(out)?;
                    v.write(out)?;
                }
            }
            TypedValue::Tuple1(a) => a.write(out)?,
            TypedValue::Tuple2(a, b) => {
                a.write(out)?;
                b.write(out)?;
            }
            TypedValue::Tuple3(a, b, c) => {
                a.write(out)?;
                b.write(out)?;
                c.write(out)?;
            }
            TypedValue::PublicKey(Some(key)) => key.write(out),
            TypedValue::PublicKey(None) => {
                return Err(CLValueError::NotSerializable("absent public key".to_string()))
            }
            TypedValue::AccountHash(hash) => out.extend_from_slice(&hash.0),
            TypedValue::Any(bytes) => out.extend_from_slice(bytes),
            TypedValue::Other(display) => {
                return Err(CLValueError::NotSerializable(display.clone()))
            }
        }
        Ok(())
    }

    /// Reinterpret a 32-byte array as an account hash
    pub fn into_account_hash_hint(self) -> Self {
        match self {
            TypedValue::ByteArray(bytes) if bytes.len() == 32 => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&bytes);
                TypedValue::AccountHash(AccountHash(hash))
            }
            other => other,
        }
    }
}

fn write_wide(out: &mut Vec<u8>, value: &WideUint, max_bytes: usize) -> Result<(), CLValueError> {
    if value.byte_len() > max_bytes {
        return Err(CLValueError::Overflow);
    }
    value.write(out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_u512_amount() {
        // 10_000_000_000_000 motes
        let bytes = hex::decode("0600a0724e1809").unwrap();
        let value = TypedValue::from_bytes(&CLType::U512, &bytes).unwrap();
        assert_eq!(value, TypedValue::U512(WideUint::from_u64(10_000_000_000_000)));
        assert_eq!(value.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn test_decode_option_some_and_none() {
        let some = TypedValue::from_bytes(&CLType::option(CLType::U64), &[1, 35, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(
            some,
            TypedValue::Option { inner_type: CLType::U64, value: Some(Box::new(TypedValue::U64(35))) }
        );

        let none = TypedValue::from_bytes(&CLType::option(CLType::U64), &[0]).unwrap();
        assert_eq!(none, TypedValue::Option { inner_type: CLType::U64, value: None });
    }

    #[test]
    fn test_decode_nested_list() {
        let ty = CLType::list(CLType::list(CLType::U8));
        let bytes = [2, 0, 0, 0, 1, 0, 0, 0, 7, 0, 0, 0, 0];
        let value = TypedValue::from_bytes(&ty, &bytes).unwrap();
        match &value {
            TypedValue::List { element_type, items } => {
                assert_eq!(*element_type, CLType::list(CLType::U8));
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected list, got {:?}", other),
        }
        assert_eq!(value.cl_type(), Some(ty));
    }

    #[test]
    fn test_nested_unit_lists_are_bounded() {
        // 200 inner lists of 65536 units each, from 804 bytes
        let ty = CLType::list(CLType::list(CLType::Unit));
        let mut bytes = 200u32.to_le_bytes().to_vec();
        for _ in 0..200 {
            bytes.extend_from_slice(&(1u32 << 16).to_le_bytes());
        }
        assert_eq!(TypedValue::from_bytes(&ty, &bytes), Err(CLValueError::TooManyElements));

        let mut small = 2u32.to_le_bytes().to_vec();
        small.extend_from_slice(&3u32.to_le_bytes());
        small.extend_from_slice(&0u32.to_le_bytes());
        match TypedValue::from_bytes(&ty, &small).unwrap() {
            TypedValue::List { items, .. } => assert_eq!(items.len(), 2),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_unit_list_within_allowance_decodes() {
        let bytes = 1000u32.to_le_bytes();
        match TypedValue::from_bytes(&CLType::list(CLType::Unit), &bytes).unwrap() {
            TypedValue::List { items, .. } => assert_eq!(items.len(), 1000),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_result_tags() {
        let ty = CLType::result(CLType::U8, CLType::String);
        let ok = TypedValue::from_bytes(&ty, &[1, 9]).unwrap();
        assert!(matches!(ok, TypedValue::Result { is_ok: true, .. }));

        let err = TypedValue::from_bytes(&ty, &[0, 2, 0, 0, 0, b'n', b'o']).unwrap();
        assert!(matches!(err, TypedValue::Result { is_ok: false, .. }));

        assert!(TypedValue::from_bytes(&ty, &[5, 9]).is_err());
    }

    #[test]
    fn test_map_rejects_duplicate_keys() {
        let ty = CLType::map(CLType::U8, CLType::U8);
        assert!(TypedValue::from_bytes(&ty, &[2, 0, 0, 0, 1, 10, 2, 20]).is_ok());
        assert!(matches!(
            TypedValue::from_bytes(&ty, &[2, 0, 0, 0, 1, 10, 1, 20]),
            Err(CLValueError::DuplicateMapKey)
        ));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        assert!(matches!(
            TypedValue::from_bytes(&CLType::U8, &[1, 2]),
            Err(CLValueError::LeftOverBytes(1))
        ));
    }

    #[test]
    fn test_huge_list_count_does_not_preallocate() {
        let bytes = [0xff, 0xff, 0xff, 0xff];
        assert!(TypedValue::from_bytes(&CLType::list(CLType::U64), &bytes).is_err());
    }

    #[test]
    fn test_other_cannot_be_serialized() {
        assert!(TypedValue::Other("?".to_string()).to_bytes().is_err());
        assert!(TypedValue::Other("?".to_string()).cl_type().is_none());
    }

    #[test]
    fn test_account_hash_hint() {
        let hinted = TypedValue::ByteArray(vec![3; 32]).into_account_hash_hint();
        assert_eq!(hinted, TypedValue::AccountHash(AccountHash([3; 32])));
        let untouched = TypedValue::ByteArray(vec![3; 4]).into_account_hash_hint();
        assert!(matches!(untouched, TypedValue::ByteArray(_)));
    }
}
