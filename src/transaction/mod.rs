//! Transactions
//!
//! Two wire encodings are supported and resolved once, at parse time, into the
//! [`Transaction`] sum type:
//! - legacy deploys (`header` + `payment` + `session`)
//! - versioned transactions (`payload`)
//!
//! Everything downstream (review view, hashing, approvals, validation) works
//! on the sum type.

pub mod approval;
pub mod args;
pub mod builder;
pub mod deploy;
pub mod motes;
pub mod time;
pub mod v1;
pub mod view;

#[cfg(test)]
mod tests;

use serde_json::Value;
use thiserror::Error;

use crate::clvalue::CLValueError;
use crate::serde_bytes::Digest;
use crate::signing::verify_signature;

pub use approval::{Approval, Signature};
pub use args::RuntimeArgs;
pub use builder::{DeployBuilder, TransactionV1Builder};
pub use deploy::{Deploy, DeployHeader, DeployKind, ExecutableDeployItem};
pub use motes::{motes_to_cspr, try_motes_to_cspr};
pub use time::{TimeDiff, Timestamp};
pub use v1::{EntryPoint, InitiatorAddr, PricingMode, TransactionTarget, TransactionV1};
pub use view::TransactionDecoder;

/// Envelope keys callers may wrap a transaction in
const ENVELOPE_KEYS: [&str; 4] = ["deploy", "Deploy", "Version1", "transaction"];

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("Malformed transaction: {0}")]
    Malformed(String),

    #[error("Unparseable session code: {raw}")]
    UnparseableSessionCode { raw: String },

    #[error("Invalid argument value: {0}")]
    CLValue(#[from] CLValueError),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid ttl: {0}")]
    InvalidTtl(String),

    #[error("Invalid motes amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A decoded transaction in either encoding
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    Deploy(Deploy),
    V1(TransactionV1),
}

impl Transaction {
    /// Detect the encoding structurally and parse it
    pub fn from_json(raw: &Value) -> Result<Self, TransactionError> {
        let inner = strip_envelope(raw);
        let has = |key: &str| inner.get(key).is_some();

        if has("header") && has("session") {
            Deploy::from_json(inner).map(Transaction::Deploy)
        } else if has("payload") {
            TransactionV1::from_json(inner).map(Transaction::V1)
        } else {
            Err(TransactionError::Malformed(
                "input is neither a deploy nor a versioned transaction".to_string(),
            ))
        }
    }

    pub fn to_json(&self) -> Result<Value, TransactionError> {
        let value = match self {
            Transaction::Deploy(deploy) => serde_json::to_value(deploy)?,
            Transaction::V1(v1) => serde_json::to_value(v1)?,
        };
        Ok(value)
    }

    /// Hash as declared in the transaction
    pub fn hash(&self) -> Digest {
        match self {
            Transaction::Deploy(deploy) => deploy.hash,
            Transaction::V1(v1) => v1.hash,
        }
    }

    /// Hash recomputed from the canonical bytes
    pub fn compute_hash(&self) -> Digest {
        match self {
            Transaction::Deploy(deploy) => deploy.header.compute_hash(),
            Transaction::V1(v1) => v1.payload.compute_hash(),
        }
    }

    pub fn initiator(&self) -> InitiatorAddr {
        match self {
            Transaction::Deploy(deploy) => InitiatorAddr::PublicKey(deploy.header.account),
            Transaction::V1(v1) => v1.payload.initiator_addr,
        }
    }

    pub fn chain_name(&self) -> &str {
        match self {
            Transaction::Deploy(deploy) => &deploy.header.chain_name,
            Transaction::V1(v1) => &v1.payload.chain_name,
        }
    }

    pub fn kind_label(&self) -> String {
        match self {
            Transaction::Deploy(deploy) => deploy.kind().label().to_string(),
            Transaction::V1(v1) => v1.payload.fields.entry_point.label().to_string(),
        }
    }

    pub fn approvals(&self) -> &[Approval] {
        match self {
            Transaction::Deploy(deploy) => &deploy.approvals,
            Transaction::V1(v1) => &v1.approvals,
        }
    }

    /// Attach an approval, replacing an earlier one from the same signer
    pub fn attach(&mut self, approval: Approval) {
        match self {
            Transaction::Deploy(deploy) => deploy.attach(approval),
            Transaction::V1(v1) => v1.attach(approval),
        }
    }

    /// Structural, hash and signature checks
    pub fn validate(&self, require_account_match: bool) -> Result<(), TransactionError> {
        match self {
            Transaction::Deploy(deploy) => deploy.check_hashes()?,
            Transaction::V1(v1) => v1.check_hashes()?,
        }

        let approvals = self.approvals();
        if approvals.is_empty() {
            return Err(TransactionError::Validation("transaction has no approvals".to_string()));
        }

        let hash = self.hash();
        for approval in approvals {
            verify_signature(&approval.signer, hash.as_bytes(), &approval.signature).map_err(|e| {
                TransactionError::Validation(format!("approval from {} does not verify: {}", approval.signer, e))
            })?;
        }

        if require_account_match {
            let initiator = self.initiator();
            if !approvals.iter().any(|a| initiator.is_controlled_by(&a.signer)) {
                return Err(TransactionError::Validation(format!(
                    "no approval from the initiating account {}",
                    initiator.display()
                )));
            }
        }

        Ok(())
    }
}

/// Peel `{"deploy": …}`-style single-key envelopes
fn strip_envelope(raw: &Value) -> &Value {
    let mut current = raw;
    for _ in 0..ENVELOPE_KEYS.len() {
        match current.as_object() {
            Some(map) if map.len() == 1 => {
                match ENVELOPE_KEYS.iter().find_map(|key| map.get(*key)) {
                    Some(inner) => current = inner,
                    None => break,
                }
            }
            _ => break,
        }
    }
    current
}
