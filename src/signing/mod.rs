//! Signing
//!
//! - `curves`: Ed25519 / Secp256k1 primitives behind a single curve dispatch
//! - `engine`: [`SignatureEngine`], the key → confirm → sign → attach → validate
//!   pipeline over the two host collaborators
//! - `message`: prefixed message signatures

pub mod curves;
pub mod engine;
pub mod message;

pub use curves::{public_key_for, sign, verify_signature};
pub use engine::{sign_transaction_with_key, SignOutcome, SignatureEngine};
pub use message::{message_bytes, sign_message, verify_message};

use crate::transaction::Transaction;

/// Error types for signing
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Public key mismatch: host reported {reported}, key derives {derived}")]
    PublicKeyMismatch { reported: String, derived: String },

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Signature verification failed")]
    VerificationFailed,

    /// The signature is attached but the signed transaction does not validate.
    /// The signed transaction is handed back so the caller can inspect it.
    #[error("Post-sign validation failed: {reason}")]
    PostSignValidationFailed {
        reason: String,
        transaction: Box<Transaction>,
    },
}

pub type SigningResult<T> = Result<T, SigningError>;
