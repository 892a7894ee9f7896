//! Message signing
//!
//! Messages are signed as `prefix ‖ message` (UTF-8), default prefix
//! `"Casper Message:\n"`, under the same curve dispatch as transactions.
//! Only the raw 64-byte signature is returned; there is nothing to attach.

use crate::clvalue::PublicKey;
use crate::transaction::Signature;
use crate::types::SigningKey;

use super::{curves, SigningError, SigningResult};

/// Bytes covered by a message signature
pub fn message_bytes(prefix: &str, message: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(prefix.len() + message.len());
    bytes.extend_from_slice(prefix.as_bytes());
    bytes.extend_from_slice(message.as_bytes());
    bytes
}

pub fn sign_message(key: &SigningKey, prefix: &str, message: &str) -> SigningResult<Signature> {
    curves::sign(key, &message_bytes(prefix, message))
}

/// Verify a message signature given as hex, either the raw 64 bytes or the
/// tagged 65-byte approval form
pub fn verify_message(
    public_key: &PublicKey,
    prefix: &str,
    message: &str,
    signature_hex: &str,
) -> SigningResult<()> {
    let cleaned = signature_hex.trim().trim_start_matches("0x");
    let bytes = hex::decode(cleaned)
        .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;

    let signature = match bytes.len() {
        64 => {
            let mut raw = [0u8; 64];
            raw.copy_from_slice(&bytes);
            Signature::new(public_key.curve(), raw)
        }
        65 => Signature::from_hex(cleaned)
            .map_err(|e| SigningError::InvalidSignature(e.to_string()))?,
        n => {
            return Err(SigningError::InvalidSignature(format!(
                "Expected 64 or 65 bytes, got {}",
                n
            )))
        }
    };

    curves::verify_signature(public_key, &message_bytes(prefix, message), &signature)
}
