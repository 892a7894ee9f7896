//! Curve primitives
//!
//! - Ed25519 signs the message bytes directly (detached signature)
//! - Secp256k1 signs SHA-256(message) with RFC 6979 deterministic ECDSA and
//!   emits the 64-byte low-S compact form

use ed25519_dalek::{Signer, Verifier};
use secp256k1::{ecdsa, Message, Secp256k1, SecretKey};
use zeroize::Zeroizing;

use crate::clvalue::PublicKey;
use crate::transaction::Signature;
use crate::types::{Curve, SigningKey};
use crate::utils::crypto::sha256;

use super::SigningError;

const SECRET_KEY_LENGTH: usize = 32;

fn secret_bytes(private_key: &[u8]) -> Result<Zeroizing<[u8; SECRET_KEY_LENGTH]>, SigningError> {
    // 64-byte ed25519 keypairs carry the secret in the first half
    let secret = match private_key.len() {
        SECRET_KEY_LENGTH => private_key,
        64 => &private_key[..SECRET_KEY_LENGTH],
        n => {
            return Err(SigningError::InvalidPrivateKey(format!(
                "Expected 32 bytes, got {}",
                n
            )))
        }
    };
    let mut out = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
    out.copy_from_slice(secret);
    Ok(out)
}

/// Public key belonging to a private key on the given curve
pub fn public_key_for(curve: Curve, private_key: &[u8]) -> Result<PublicKey, SigningError> {
    let secret = secret_bytes(private_key)?;
    match curve {
        Curve::Ed25519 => {
            let signing_key = ed25519_dalek::SigningKey::from_bytes(&secret);
            Ok(PublicKey::Ed25519(signing_key.verifying_key().to_bytes()))
        }
        Curve::Secp256k1 => {
            let secp = Secp256k1::signing_only();
            let secret_key = SecretKey::from_slice(secret.as_ref())
                .map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))?;
            let public_key = secp256k1::PublicKey::from_secret_key(&secp, &secret_key);
            Ok(PublicKey::Secp256k1(public_key.serialize()))
        }
    }
}

/// Sign `message` with the algorithm implied by the key's curve
pub fn sign(key: &SigningKey, message: &[u8]) -> Result<Signature, SigningError> {
    let secret = secret_bytes(&key.private_key)?;
    match key.curve {
        Curve::Ed25519 => {
            let signing_key = ed25519_dalek::SigningKey::from_bytes(&secret);
            Ok(Signature::Ed25519(signing_key.sign(message).to_bytes()))
        }
        Curve::Secp256k1 => {
            let secp = Secp256k1::signing_only();
            let secret_key = SecretKey::from_slice(secret.as_ref())
                .map_err(|e| SigningError::InvalidPrivateKey(e.to_string()))?;
            let digest = Message::from_digest(sha256(message));
            let signature = secp.sign_ecdsa(&digest, &secret_key);
            Ok(Signature::Secp256k1(signature.serialize_compact()))
        }
    }
}

/// Verify `signature` by `signer` over `message`
pub fn verify_signature(signer: &PublicKey, message: &[u8], signature: &Signature) -> Result<(), SigningError> {
    match (signer, signature) {
        (PublicKey::Ed25519(key), Signature::Ed25519(raw)) => {
            let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(key)
                .map_err(|e| SigningError::InvalidPublicKey(e.to_string()))?;
            let signature = ed25519_dalek::Signature::from_bytes(raw);
            verifying_key
                .verify(message, &signature)
                .map_err(|_| SigningError::VerificationFailed)
        }
        (PublicKey::Secp256k1(key), Signature::Secp256k1(raw)) => {
            let secp = Secp256k1::verification_only();
            let public_key = secp256k1::PublicKey::from_slice(key)
                .map_err(|e| SigningError::InvalidPublicKey(e.to_string()))?;
            let mut signature = ecdsa::Signature::from_compact(raw)
                .map_err(|e| SigningError::InvalidSignature(e.to_string()))?;
            signature.normalize_s();
            let digest = Message::from_digest(sha256(message));
            secp.verify_ecdsa(&digest, &signature, &public_key)
                .map_err(|_| SigningError::VerificationFailed)
        }
        _ => Err(SigningError::InvalidSignature(format!(
            "{} signature for a {} key",
            signature.curve(),
            signer.curve()
        ))),
    }
}
