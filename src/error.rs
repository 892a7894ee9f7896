//! Unified error types for the signer core
//!
//! Module-level errors (`CLValueError`, `TransactionError`, `SigningError`,
//! `HostError`) all flow into [`SignerError`] so the operation surface can
//! report a single `{error: message}` shape.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clvalue::CLValueError;
use crate::host::HostError;
use crate::signing::SigningError;
use crate::transaction::TransactionError;

/// Main error type for all signer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl SignerError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors
    pub fn malformed_transaction(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedTransaction, msg)
    }

    pub fn key_derivation(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::KeyDerivationError, msg)
    }

    pub fn unsupported_curve(curve: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::UnsupportedCurve,
            format!(
                "Unsupported curve: {}. Only ed25519 and secp256k1 are supported",
                curve
            ),
        )
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(ErrorCode::MethodNotFound, format!("Method not found: {}", method))
    }

    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// Hard failures terminate the request instead of becoming `{error}` results
    pub fn is_hard_failure(&self) -> bool {
        self.code == ErrorCode::MethodNotFound
    }
}

impl fmt::Display for SignerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SignerError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    MalformedTransaction,
    UnparseableSessionCode,
    InvalidParams,
    MethodNotFound,

    // Host collaborator errors
    KeyDerivationError,
    ConfirmationFailed,

    // Crypto errors
    UnsupportedCurve,
    SigningFailed,
    PostSignValidationFailed,

    // Parse errors
    JsonError,
    HexError,

    // Internal
    Internal,
}

/// Result type alias for signer operations
pub type SignerResult<T> = Result<T, SignerError>;

// Conversions from module and library error types

impl From<TransactionError> for SignerError {
    fn from(e: TransactionError) -> Self {
        let code = match &e {
            TransactionError::UnparseableSessionCode { .. } => ErrorCode::UnparseableSessionCode,
            TransactionError::Validation(_) => ErrorCode::PostSignValidationFailed,
            _ => ErrorCode::MalformedTransaction,
        };
        SignerError::new(code, e.to_string())
    }
}

impl From<CLValueError> for SignerError {
    fn from(e: CLValueError) -> Self {
        SignerError::new(ErrorCode::MalformedTransaction, e.to_string())
    }
}

impl From<SigningError> for SignerError {
    fn from(e: SigningError) -> Self {
        match e {
            SigningError::UnsupportedCurve(curve) => SignerError::unsupported_curve(curve),
            SigningError::PostSignValidationFailed { .. } => {
                SignerError::new(ErrorCode::PostSignValidationFailed, e.to_string())
            }
            SigningError::InvalidPrivateKey(_) | SigningError::PublicKeyMismatch { .. } => {
                SignerError::key_derivation(e.to_string())
            }
            other => SignerError::signing_failed(other.to_string()),
        }
    }
}

impl From<HostError> for SignerError {
    fn from(e: HostError) -> Self {
        let code = match &e {
            HostError::KeyDerivation(_) | HostError::InvalidDerivationIndex(_) => {
                ErrorCode::KeyDerivationError
            }
            HostError::Confirmation(_) => ErrorCode::ConfirmationFailed,
        };
        SignerError::new(code, e.to_string())
    }
}

impl From<serde_json::Error> for SignerError {
    fn from(e: serde_json::Error) -> Self {
        SignerError::new(ErrorCode::JsonError, e.to_string())
    }
}

impl From<hex::FromHexError> for SignerError {
    fn from(e: hex::FromHexError) -> Self {
        SignerError::new(ErrorCode::HexError, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let err = SignerError::key_derivation("index out of range")
            .with_details("requested: -1");

        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("key_derivation_error"));
        assert!(json.contains("index out of range"));
    }

    #[test]
    fn test_unsupported_curve_message_names_both_curves() {
        let err = SignerError::unsupported_curve("p256");
        assert_eq!(err.code, ErrorCode::UnsupportedCurve);
        assert!(err.message.contains("p256"));
        assert!(err.message.contains("ed25519"));
        assert!(err.message.contains("secp256k1"));
    }

    #[test]
    fn test_only_method_not_found_is_hard() {
        assert!(SignerError::method_not_found("casper_foo").is_hard_failure());
        assert!(!SignerError::malformed_transaction("bad").is_hard_failure());
    }

    #[test]
    fn test_session_error_maps_to_its_code() {
        let err: SignerError = TransactionError::UnparseableSessionCode {
            raw: "{\"Bogus\":{}}".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::UnparseableSessionCode);
        assert!(err.message.contains("Bogus"));
    }

    #[test]
    fn test_host_key_faults_are_derivation_errors() {
        let err: SignerError = SigningError::PublicKeyMismatch {
            reported: "01aa".to_string(),
            derived: "01bb".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::KeyDerivationError);

        let err: SignerError = SigningError::InvalidSignature("short".to_string()).into();
        assert_eq!(err.code, ErrorCode::SigningFailed);
    }
}
