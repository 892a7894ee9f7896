//! Wide unsigned integers (U128 / U256 / U512)
//!
//! Stored as a minimal little-endian magnitude, which is exactly how the
//! values travel on the wire (one length byte + magnitude).

use std::fmt;

use super::bytesrepr::ByteReader;
use super::CLValueError;

/// Arbitrary-width unsigned integer with exact decimal conversion
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WideUint(Vec<u8>);

impl WideUint {
    pub const ZERO: WideUint = WideUint(Vec::new());

    /// Create from little-endian bytes (trailing zero bytes are trimmed)
    pub fn from_le_bytes(bytes: &[u8]) -> Self {
        let len = bytes.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
        WideUint(bytes[..len].to_vec())
    }

    pub fn from_u64(value: u64) -> Self {
        Self::from_le_bytes(&value.to_le_bytes())
    }

    pub fn from_u128(value: u128) -> Self {
        Self::from_le_bytes(&value.to_le_bytes())
    }

    /// Parse a plain decimal string (digits only)
    pub fn from_dec_str(s: &str) -> Result<Self, CLValueError> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CLValueError::InvalidNumber(s.to_string()));
        }

        let mut le: Vec<u8> = Vec::new();
        for digit in s.bytes() {
            let mut carry = (digit - b'0') as u16;
            for byte in le.iter_mut() {
                let cur = (*byte as u16) * 10 + carry;
                *byte = (cur & 0xff) as u8;
                carry = cur >> 8;
            }
            while carry > 0 {
                le.push((carry & 0xff) as u8);
                carry >>= 8;
            }
        }
        Ok(Self::from_le_bytes(&le))
    }

    /// Minimal little-endian magnitude
    pub fn as_le_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn byte_len(&self) -> usize {
        self.0.len()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Read one length byte + magnitude, rejecting values wider than `max_bytes`
    pub fn read(reader: &mut ByteReader<'_>, max_bytes: usize) -> Result<Self, CLValueError> {
        let len = reader.u8()? as usize;
        if len > max_bytes {
            return Err(CLValueError::Formatting(format!(
                "integer of {} bytes exceeds {} byte width",
                len, max_bytes
            )));
        }
        Ok(Self::from_le_bytes(reader.take(len)?))
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(self.0.len() as u8);
        out.extend_from_slice(&self.0);
    }

    /// Exact base-10 rendering
    pub fn to_dec_string(&self) -> String {
        if self.0.is_empty() {
            return "0".to_string();
        }

        // Big-endian working copy, repeatedly divided by 10
        let mut work: Vec<u8> = self.0.iter().rev().copied().collect();
        let mut digits = Vec::new();
        while work.iter().any(|b| *b != 0) {
            let mut rem: u16 = 0;
            for byte in work.iter_mut() {
                let cur = (rem << 8) | (*byte as u16);
                *byte = (cur / 10) as u8;
                rem = cur % 10;
            }
            digits.push(char::from(b'0' + rem as u8));
        }
        digits.iter().rev().collect()
    }
}

impl fmt::Display for WideUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dec_string())
    }
}
