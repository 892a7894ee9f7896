//! Signer configuration
//!
//! Settings presets:
//! - `standard()`: the signing key must be the transaction's initiator
//! - `co_signer()`: approvals from keys other than the initiator are allowed
//!   (multi-party deploys)

use crate::error::{SignerError, SignerResult};
use crate::utils::logging;

/// BIP44 coin type registered for Casper
pub const CASPER_COIN_TYPE: u32 = 506;

/// Prefix prepended to every signed message
pub const MESSAGE_PREFIX: &str = "Casper Message:\n";

/// Highest non-hardened derivation index
pub const MAX_NON_HARDENED_INDEX: u32 = (1 << 31) - 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerSettings {
    /// Coin type sent with every key request
    pub coin_type: u32,
    pub message_prefix: String,
    /// Largest derivation index accepted from callers
    pub max_derivation_index: u32,
    /// Post-sign validation requires an approval from the initiator
    pub require_account_match: bool,
    pub debug_logging: bool,
    /// Redact keys, accounts and hashes in log output
    pub redact_logs: bool,
}

impl Default for SignerSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl SignerSettings {
    pub fn standard() -> Self {
        Self {
            coin_type: CASPER_COIN_TYPE,
            message_prefix: MESSAGE_PREFIX.to_string(),
            max_derivation_index: MAX_NON_HARDENED_INDEX,
            require_account_match: true,
            debug_logging: false,
            redact_logs: true,
        }
    }

    pub fn co_signer() -> Self {
        Self {
            require_account_match: false,
            ..Self::standard()
        }
    }

    /// Reject settings the engine cannot operate with
    pub fn validate(&self) -> SignerResult<()> {
        if self.coin_type == 0 {
            return Err(SignerError::invalid_params("coin_type must be non-zero"));
        }
        if self.message_prefix.is_empty() {
            return Err(SignerError::invalid_params("message_prefix must not be empty"));
        }
        if self.max_derivation_index > MAX_NON_HARDENED_INDEX {
            return Err(SignerError::invalid_params(format!(
                "max_derivation_index {} exceeds the non-hardened range",
                self.max_derivation_index
            )));
        }
        Ok(())
    }

    /// Non-fatal observations about risky combinations
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.redact_logs && self.debug_logging {
            warnings.push("Warning: Debug logging enabled without log redaction".to_string());
        }

        if !self.require_account_match {
            warnings.push(
                "Warning: Signatures from non-initiator keys will pass validation".to_string(),
            );
        }

        warnings
    }

    /// Push the logging flags into the global logger
    pub fn apply_logging(&self) {
        if self.debug_logging {
            logging::enable_debug();
        } else {
            logging::disable_debug();
        }
        logging::set_redaction(self.redact_logs);
    }
}
