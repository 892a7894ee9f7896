//! Approvals: a signer's public key plus its tagged signature

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::clvalue::keys::{ED25519_TAG, SECP256K1_TAG};
use crate::clvalue::PublicKey;
use crate::types::Curve;

use super::TransactionError;

pub const SIGNATURE_LENGTH: usize = 64;

/// Curve-tagged 64-byte signature (`01…` Ed25519, `02…` Secp256k1 compact)
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Ed25519([u8; SIGNATURE_LENGTH]),
    Secp256k1([u8; SIGNATURE_LENGTH]),
}

impl Signature {
    pub fn new(curve: Curve, raw: [u8; SIGNATURE_LENGTH]) -> Self {
        match curve {
            Curve::Ed25519 => Signature::Ed25519(raw),
            Curve::Secp256k1 => Signature::Secp256k1(raw),
        }
    }

    pub fn curve(&self) -> Curve {
        match self {
            Signature::Ed25519(_) => Curve::Ed25519,
            Signature::Secp256k1(_) => Curve::Secp256k1,
        }
    }

    pub fn raw_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        match self {
            Signature::Ed25519(raw) | Signature::Secp256k1(raw) => raw,
        }
    }

    /// Tag byte followed by the raw signature
    pub fn to_bytes(&self) -> Vec<u8> {
        let tag = match self {
            Signature::Ed25519(_) => ED25519_TAG,
            Signature::Secp256k1(_) => SECP256K1_TAG,
        };
        let mut out = Vec::with_capacity(1 + SIGNATURE_LENGTH);
        out.push(tag);
        out.extend_from_slice(self.raw_bytes());
        out
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, TransactionError> {
        let bytes = hex::decode(s.trim())
            .map_err(|e| TransactionError::InvalidSignature(e.to_string()))?;
        let (tag, raw) = bytes
            .split_first()
            .ok_or_else(|| TransactionError::InvalidSignature("empty signature".to_string()))?;
        let raw: [u8; SIGNATURE_LENGTH] = raw.try_into().map_err(|_| {
            TransactionError::InvalidSignature(format!("expected {} signature bytes, got {}", SIGNATURE_LENGTH, raw.len()))
        })?;
        match *tag {
            ED25519_TAG => Ok(Signature::Ed25519(raw)),
            SECP256K1_TAG => Ok(Signature::Secp256k1(raw)),
            other => Err(TransactionError::InvalidSignature(format!("unknown signature tag {}", other))),
        }
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub signer: PublicKey,
    pub signature: Signature,
}

/// Add an approval, replacing any earlier one from the same signer
pub(crate) fn upsert(approvals: &mut Vec<Approval>, approval: Approval) {
    match approvals.iter_mut().find(|a| a.signer == approval.signer) {
        Some(existing) => *existing = approval,
        None => approvals.push(approval),
    }
}
