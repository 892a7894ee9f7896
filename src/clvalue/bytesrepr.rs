//! Little-endian byte representation shared by values, types and transactions

use super::CLValueError;

/// Elements a reader may produce beyond one per input byte (zero-width `Unit`s)
pub const ZERO_WIDTH_ALLOWANCE: usize = 1 << 16;

/// Cursor over a byte slice with typed little-endian reads
///
/// Every collection element decoded through the reader spends one unit of an
/// element budget of `len + ZERO_WIDTH_ALLOWANCE`, so nested zero-width
/// elements cannot expand a short input into an unbounded value.
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    element_budget: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0, element_budget: bytes.len().saturating_add(ZERO_WIDTH_ALLOWANCE) }
    }

    /// Account for one decoded list, map or tuple element
    pub fn spend_element(&mut self) -> Result<(), CLValueError> {
        match self.element_budget.checked_sub(1) {
            Some(left) => {
                self.element_budget = left;
                Ok(())
            }
            None => Err(CLValueError::TooManyElements),
        }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Take the next `n` bytes
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CLValueError> {
        if self.remaining() < n {
            return Err(CLValueError::EarlyEndOfStream);
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Take everything that is left
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }

    pub fn u8(&mut self) -> Result<u8, CLValueError> {
        Ok(self.take(1)?[0])
    }

    pub fn bool(&mut self) -> Result<bool, CLValueError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CLValueError::Formatting(format!("invalid bool byte {}", other))),
        }
    }

    pub fn u32(&mut self) -> Result<u32, CLValueError> {
        Ok(u32::from_le_bytes(self.array::<4>()?))
    }

    pub fn i32(&mut self) -> Result<i32, CLValueError> {
        Ok(i32::from_le_bytes(self.array::<4>()?))
    }

    pub fn u64(&mut self) -> Result<u64, CLValueError> {
        Ok(u64::from_le_bytes(self.array::<8>()?))
    }

    pub fn i64(&mut self) -> Result<i64, CLValueError> {
        Ok(i64::from_le_bytes(self.array::<8>()?))
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], CLValueError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// u32 length prefix followed by UTF-8
    pub fn string(&mut self) -> Result<String, CLValueError> {
        let len = self.u32()? as usize;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| CLValueError::InvalidUtf8)
    }

    /// Fails if unread bytes remain
    pub fn finish(self) -> Result<(), CLValueError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CLValueError::LeftOverBytes(n)),
        }
    }
}

pub fn write_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

pub fn write_u64(out: &mut Vec<u8>, value: u64) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// u32 length prefix followed by the raw bytes
pub fn write_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_u32(out, bytes.len() as u32);
    out.extend_from_slice(bytes);
}

pub fn write_string(out: &mut Vec<u8>, value: &str) {
    write_bytes(out, value.as_bytes());
}

/// `Option<u32>` as 0 / 1 + value
pub fn write_option_u32(out: &mut Vec<u8>, value: Option<u32>) {
    match value {
        None => out.push(0),
        Some(v) => {
            out.push(1);
            write_u32(out, v);
        }
    }
}
