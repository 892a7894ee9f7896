//! Versioned transaction payload
//!
//! The hash commits to the whole payload: initiator, timestamp, ttl,
//! chain_name, pricing_mode, args, target, entry_point, scheduling, in that
//! order.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::clvalue::bytesrepr::{write_bytes, write_option_u32, write_string, write_u64};
use crate::clvalue::{AccountHash, PublicKey};
use crate::serde_bytes::Digest;
use crate::utils::crypto::blake2b256;

use super::approval::{self, Approval};
use super::args::RuntimeArgs;
use super::time::{TimeDiff, Timestamp};
use super::TransactionError;

// =============================================================================
// Initiator
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitiatorAddr {
    PublicKey(PublicKey),
    AccountHash(AccountHash),
}

impl InitiatorAddr {
    pub fn account_hash(&self) -> AccountHash {
        match self {
            InitiatorAddr::PublicKey(key) => key.to_account_hash(),
            InitiatorAddr::AccountHash(hash) => *hash,
        }
    }

    /// Public key hex, or the prefixed account hash when no key is known
    pub fn display(&self) -> String {
        match self {
            InitiatorAddr::PublicKey(key) => key.to_hex(),
            InitiatorAddr::AccountHash(hash) => hash.to_string(),
        }
    }

    pub fn is_controlled_by(&self, signer: &PublicKey) -> bool {
        match self {
            InitiatorAddr::PublicKey(key) => key == signer,
            InitiatorAddr::AccountHash(hash) => signer.to_account_hash() == *hash,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        match self {
            InitiatorAddr::PublicKey(key) => {
                out.push(0);
                key.write(out);
            }
            InitiatorAddr::AccountHash(hash) => {
                out.push(1);
                out.extend_from_slice(&hash.0);
            }
        }
    }
}

// =============================================================================
// Pricing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingMode {
    PaymentLimited {
        payment_amount: u64,
        gas_price_tolerance: u8,
        #[serde(default = "default_true")]
        standard_payment: bool,
    },
    Fixed {
        #[serde(default)]
        additional_computation_factor: u8,
        gas_price_tolerance: u8,
    },
    Prepaid {
        receipt: Digest,
    },
}

fn default_true() -> bool {
    true
}

impl PricingMode {
    pub fn gas_price(&self) -> Option<u64> {
        match self {
            PricingMode::PaymentLimited { gas_price_tolerance, .. }
            | PricingMode::Fixed { gas_price_tolerance, .. } => Some(u64::from(*gas_price_tolerance)),
            PricingMode::Prepaid { .. } => None,
        }
    }

    pub fn payment_amount(&self) -> Option<u64> {
        match self {
            PricingMode::PaymentLimited { payment_amount, .. } => Some(*payment_amount),
            _ => None,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        match self {
            PricingMode::PaymentLimited { payment_amount, gas_price_tolerance, standard_payment } => {
                out.push(0);
                write_u64(out, *payment_amount);
                out.push(*gas_price_tolerance);
                out.push(u8::from(*standard_payment));
            }
            PricingMode::Fixed { additional_computation_factor, gas_price_tolerance } => {
                out.push(1);
                out.push(*additional_computation_factor);
                out.push(*gas_price_tolerance);
            }
            PricingMode::Prepaid { receipt } => {
                out.push(2);
                out.extend_from_slice(receipt.as_bytes());
            }
        }
    }
}

// =============================================================================
// Fields
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionArgs {
    Named(RuntimeArgs),
    Bytesrepr(#[serde(with = "crate::serde_bytes::hex_vec")] Vec<u8>),
}

impl TransactionArgs {
    fn write(&self, out: &mut Vec<u8>) {
        match self {
            TransactionArgs::Named(args) => {
                out.push(0);
                args.write(out);
            }
            TransactionArgs::Bytesrepr(bytes) => {
                out.push(1);
                write_bytes(out, bytes);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryPoint {
    Call,
    Custom(String),
    Transfer,
    AddBid,
    WithdrawBid,
    Delegate,
    Undelegate,
    Redelegate,
    ActivateBid,
    ChangeBidPublicKey,
    AddReservations,
    CancelReservations,
    Burn,
}

impl EntryPoint {
    /// Custom name, or the well-known tag name
    pub fn label(&self) -> &str {
        match self {
            EntryPoint::Call => "Call",
            EntryPoint::Custom(name) => name,
            EntryPoint::Transfer => "Transfer",
            EntryPoint::AddBid => "AddBid",
            EntryPoint::WithdrawBid => "WithdrawBid",
            EntryPoint::Delegate => "Delegate",
            EntryPoint::Undelegate => "Undelegate",
            EntryPoint::Redelegate => "Redelegate",
            EntryPoint::ActivateBid => "ActivateBid",
            EntryPoint::ChangeBidPublicKey => "ChangeBidPublicKey",
            EntryPoint::AddReservations => "AddReservations",
            EntryPoint::CancelReservations => "CancelReservations",
            EntryPoint::Burn => "Burn",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            EntryPoint::Call => 0,
            EntryPoint::Custom(_) => 1,
            EntryPoint::Transfer => 2,
            EntryPoint::AddBid => 3,
            EntryPoint::WithdrawBid => 4,
            EntryPoint::Delegate => 5,
            EntryPoint::Undelegate => 6,
            EntryPoint::Redelegate => 7,
            EntryPoint::ActivateBid => 8,
            EntryPoint::ChangeBidPublicKey => 9,
            EntryPoint::AddReservations => 10,
            EntryPoint::CancelReservations => 11,
            EntryPoint::Burn => 12,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![self.tag()];
        if let EntryPoint::Custom(name) = self {
            write_string(&mut out, name);
        }
        out
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionRuntime {
    #[default]
    VmCasperV1,
    VmCasperV2,
}

impl TransactionRuntime {
    fn tag(&self) -> u8 {
        match self {
            TransactionRuntime::VmCasperV1 => 0,
            TransactionRuntime::VmCasperV2 => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvocationTarget {
    ByHash(Digest),
    ByName(String),
    ByPackageHash {
        addr: Digest,
        #[serde(default)]
        version: Option<u32>,
    },
    ByPackageName {
        name: String,
        #[serde(default)]
        version: Option<u32>,
    },
}

impl InvocationTarget {
    fn write(&self, out: &mut Vec<u8>) {
        match self {
            InvocationTarget::ByHash(hash) => {
                out.push(0);
                out.extend_from_slice(hash.as_bytes());
            }
            InvocationTarget::ByName(name) => {
                out.push(1);
                write_string(out, name);
            }
            InvocationTarget::ByPackageHash { addr, version } => {
                out.push(2);
                out.extend_from_slice(addr.as_bytes());
                write_option_u32(out, *version);
            }
            InvocationTarget::ByPackageName { name, version } => {
                out.push(3);
                write_string(out, name);
                write_option_u32(out, *version);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionTarget {
    Native,
    Stored {
        id: InvocationTarget,
        #[serde(default)]
        runtime: TransactionRuntime,
    },
    Session {
        #[serde(default)]
        is_install_upgrade: bool,
        #[serde(with = "crate::serde_bytes::hex_vec")]
        module_bytes: Vec<u8>,
        #[serde(default)]
        runtime: TransactionRuntime,
    },
}

impl TransactionTarget {
    fn write(&self, out: &mut Vec<u8>) {
        match self {
            TransactionTarget::Native => out.push(0),
            TransactionTarget::Stored { id, runtime } => {
                out.push(1);
                id.write(out);
                out.push(runtime.tag());
            }
            TransactionTarget::Session { is_install_upgrade, module_bytes, runtime } => {
                out.push(2);
                out.push(u8::from(*is_install_upgrade));
                write_bytes(out, module_bytes);
                out.push(runtime.tag());
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransactionScheduling {
    #[default]
    Standard,
    FutureEra(u64),
    FutureTimestamp(Timestamp),
}

impl TransactionScheduling {
    fn write(&self, out: &mut Vec<u8>) {
        match self {
            TransactionScheduling::Standard => out.push(0),
            TransactionScheduling::FutureEra(era) => {
                out.push(1);
                write_u64(out, *era);
            }
            TransactionScheduling::FutureTimestamp(ts) => {
                out.push(2);
                write_u64(out, ts.millis());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionV1Fields {
    pub args: TransactionArgs,
    pub entry_point: EntryPoint,
    pub target: TransactionTarget,
    #[serde(default)]
    pub scheduling: TransactionScheduling,
}

// =============================================================================
// Payload / Transaction
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionV1Payload {
    pub initiator_addr: InitiatorAddr,
    pub timestamp: Timestamp,
    pub ttl: TimeDiff,
    pub chain_name: String,
    pub pricing_mode: PricingMode,
    pub fields: TransactionV1Fields,
}

impl TransactionV1Payload {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.initiator_addr.write(&mut out);
        write_u64(&mut out, self.timestamp.millis());
        write_u64(&mut out, self.ttl.millis());
        write_string(&mut out, &self.chain_name);
        self.pricing_mode.write(&mut out);
        self.fields.args.write(&mut out);
        self.fields.target.write(&mut out);
        out.extend_from_slice(&self.fields.entry_point.to_bytes());
        self.fields.scheduling.write(&mut out);
        out
    }

    pub fn compute_hash(&self) -> Digest {
        Digest(blake2b256(&self.to_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionV1 {
    pub hash: Digest,
    pub payload: TransactionV1Payload,
    #[serde(default)]
    pub approvals: Vec<Approval>,
}

impl TransactionV1 {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TransactionError> {
        let transaction: TransactionV1 = serde_json::from_value(value.clone())
            .map_err(|e| TransactionError::Malformed(format!("invalid versioned transaction: {}", e)))?;
        if let TransactionArgs::Named(args) = &transaction.payload.fields.args {
            if let Some(name) = args.duplicate_name() {
                return Err(TransactionError::Malformed(format!("argument '{}' is declared more than once", name)));
            }
        }
        Ok(transaction)
    }

    pub fn attach(&mut self, approval: Approval) {
        approval::upsert(&mut self.approvals, approval);
    }

    pub fn check_hashes(&self) -> Result<(), TransactionError> {
        let hash = self.payload.compute_hash();
        if hash != self.hash {
            return Err(TransactionError::Validation(format!(
                "transaction hash mismatch: declared {}, computed {}",
                self.hash, hash
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_point_json_and_bytes() {
        let ep: EntryPoint = serde_json::from_value(json!("Delegate")).unwrap();
        assert_eq!(ep, EntryPoint::Delegate);
        assert_eq!(ep.to_bytes(), vec![5]);

        let custom: EntryPoint = serde_json::from_value(json!({"Custom": "mint"})).unwrap();
        assert_eq!(custom.label(), "mint");
        assert_eq!(custom.to_bytes(), vec![1, 4, 0, 0, 0, b'm', b'i', b'n', b't']);
    }

    #[test]
    fn test_initiator_forms() {
        let key = PublicKey::Ed25519([4; 32]);
        let by_key: InitiatorAddr =
            serde_json::from_value(json!({ "PublicKey": key.to_hex() })).unwrap();
        assert_eq!(by_key.display(), key.to_hex());
        assert!(by_key.is_controlled_by(&key));

        let hash = key.to_account_hash();
        let by_hash: InitiatorAddr =
            serde_json::from_value(json!({ "AccountHash": hash.to_string() })).unwrap();
        assert!(by_hash.display().starts_with("account-hash-"));
        assert!(by_hash.is_controlled_by(&key));
        assert!(!by_hash.is_controlled_by(&PublicKey::Ed25519([5; 32])));
    }

    #[test]
    fn test_pricing_mode_gas_price() {
        let fixed: PricingMode =
            serde_json::from_value(json!({"Fixed": {"gas_price_tolerance": 5}})).unwrap();
        assert_eq!(fixed.gas_price(), Some(5));
        assert_eq!(fixed.payment_amount(), None);

        let limited: PricingMode = serde_json::from_value(json!({
            "PaymentLimited": {"payment_amount": 2500000000u64, "gas_price_tolerance": 1, "standard_payment": true}
        }))
        .unwrap();
        assert_eq!(limited.payment_amount(), Some(2_500_000_000));
    }

    #[test]
    fn test_target_json() {
        let target: TransactionTarget = serde_json::from_value(json!({
            "Stored": {"id": {"ByName": "auction"}, "runtime": "VmCasperV1"}
        }))
        .unwrap();
        assert!(matches!(target, TransactionTarget::Stored { .. }));

        let native: TransactionTarget = serde_json::from_value(json!("Native")).unwrap();
        assert_eq!(native, TransactionTarget::Native);
    }
}
