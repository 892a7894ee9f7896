//! Builders producing hash-consistent unsigned transactions

use crate::clvalue::{AccountHash, CLValue, PublicKey};
use crate::serde_bytes::Digest;

use super::args::RuntimeArgs;
use super::deploy::{Deploy, DeployHeader, ExecutableDeployItem};
use super::time::{TimeDiff, Timestamp};
use super::v1::{
    EntryPoint, InitiatorAddr, PricingMode, TransactionArgs, TransactionScheduling,
    TransactionTarget, TransactionV1, TransactionV1Fields, TransactionV1Payload,
};
use super::TransactionError;

pub const DEFAULT_TTL_MINUTES: u64 = 30;
pub const DEFAULT_GAS_PRICE: u64 = 1;
/// Standard payment for a native transfer (0.1 CSPR)
pub const DEFAULT_TRANSFER_PAYMENT: u64 = 100_000_000;

/// Transfer recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferTarget {
    PublicKey(PublicKey),
    AccountHash(AccountHash),
}

impl TransferTarget {
    fn to_cl_value(self) -> CLValue {
        match self {
            TransferTarget::PublicKey(key) => CLValue::public_key(key),
            TransferTarget::AccountHash(hash) => CLValue::account_hash(hash),
        }
    }
}

/// Native transfer arguments: `target`, `amount`, `id`
pub fn transfer_args(target: TransferTarget, motes: &str, id: Option<u64>) -> Result<RuntimeArgs, TransactionError> {
    Ok(RuntimeArgs::new()
        .with("amount", CLValue::u512_dec(motes)?)
        .with("target", target.to_cl_value())
        .with("id", CLValue::option_u64(id)))
}

#[derive(Debug, Clone)]
pub struct DeployBuilder {
    account: PublicKey,
    chain_name: String,
    timestamp: Option<Timestamp>,
    ttl: TimeDiff,
    gas_price: u64,
    dependencies: Vec<Digest>,
    payment: Option<ExecutableDeployItem>,
    session: Option<ExecutableDeployItem>,
}

impl DeployBuilder {
    pub fn new(account: PublicKey, chain_name: impl Into<String>) -> Self {
        Self {
            account,
            chain_name: chain_name.into(),
            timestamp: None,
            ttl: TimeDiff::from_minutes(DEFAULT_TTL_MINUTES),
            gas_price: DEFAULT_GAS_PRICE,
            dependencies: Vec::new(),
            payment: None,
            session: None,
        }
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn ttl(mut self, ttl: TimeDiff) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn dependency(mut self, hash: Digest) -> Self {
        self.dependencies.push(hash);
        self
    }

    pub fn payment(mut self, payment: ExecutableDeployItem) -> Self {
        self.payment = Some(payment);
        self
    }

    pub fn standard_payment(self, motes: u64) -> Self {
        self.payment(ExecutableDeployItem::standard_payment(motes))
    }

    pub fn session(mut self, session: ExecutableDeployItem) -> Self {
        self.session = Some(session);
        self
    }

    /// Native transfer session; payment defaults to the standard transfer cost
    pub fn transfer(mut self, target: TransferTarget, motes: &str, id: Option<u64>) -> Result<Self, TransactionError> {
        self.session = Some(ExecutableDeployItem::Transfer { args: transfer_args(target, motes, id)? });
        if self.payment.is_none() {
            self.payment = Some(ExecutableDeployItem::standard_payment(DEFAULT_TRANSFER_PAYMENT));
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Deploy, TransactionError> {
        let payment = self
            .payment
            .ok_or_else(|| TransactionError::Malformed("deploy needs a payment".to_string()))?;
        let session = self
            .session
            .ok_or_else(|| TransactionError::Malformed("deploy needs a session".to_string()))?;

        let mut deploy = Deploy {
            hash: Digest::default(),
            header: DeployHeader {
                account: self.account,
                timestamp: self.timestamp.unwrap_or_else(Timestamp::now),
                ttl: self.ttl,
                gas_price: self.gas_price,
                body_hash: Digest::default(),
                dependencies: self.dependencies,
                chain_name: self.chain_name,
            },
            payment,
            session,
            approvals: Vec::new(),
        };
        deploy.header.body_hash = deploy.compute_body_hash();
        deploy.hash = deploy.header.compute_hash();
        Ok(deploy)
    }
}

#[derive(Debug, Clone)]
pub struct TransactionV1Builder {
    initiator: InitiatorAddr,
    chain_name: String,
    timestamp: Option<Timestamp>,
    ttl: TimeDiff,
    pricing_mode: PricingMode,
    args: TransactionArgs,
    entry_point: EntryPoint,
    target: TransactionTarget,
    scheduling: TransactionScheduling,
}

impl TransactionV1Builder {
    pub fn new(initiator: InitiatorAddr, chain_name: impl Into<String>) -> Self {
        Self {
            initiator,
            chain_name: chain_name.into(),
            timestamp: None,
            ttl: TimeDiff::from_minutes(DEFAULT_TTL_MINUTES),
            pricing_mode: PricingMode::Fixed { additional_computation_factor: 0, gas_price_tolerance: 1 },
            args: TransactionArgs::Named(RuntimeArgs::new()),
            entry_point: EntryPoint::Call,
            target: TransactionTarget::Native,
            scheduling: TransactionScheduling::Standard,
        }
    }

    /// Native transfer
    pub fn native_transfer(
        initiator: InitiatorAddr,
        chain_name: impl Into<String>,
        target: TransferTarget,
        motes: &str,
        id: Option<u64>,
    ) -> Result<Self, TransactionError> {
        Ok(Self::new(initiator, chain_name)
            .args(transfer_args(target, motes, id)?)
            .entry_point(EntryPoint::Transfer)
            .target(TransactionTarget::Native))
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn ttl(mut self, ttl: TimeDiff) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn pricing_mode(mut self, pricing_mode: PricingMode) -> Self {
        self.pricing_mode = pricing_mode;
        self
    }

    pub fn args(mut self, args: RuntimeArgs) -> Self {
        self.args = TransactionArgs::Named(args);
        self
    }

    pub fn entry_point(mut self, entry_point: EntryPoint) -> Self {
        self.entry_point = entry_point;
        self
    }

    pub fn target(mut self, target: TransactionTarget) -> Self {
        self.target = target;
        self
    }

    pub fn scheduling(mut self, scheduling: TransactionScheduling) -> Self {
        self.scheduling = scheduling;
        self
    }

    pub fn build(self) -> TransactionV1 {
        let payload = TransactionV1Payload {
            initiator_addr: self.initiator,
            timestamp: self.timestamp.unwrap_or_else(Timestamp::now),
            ttl: self.ttl,
            chain_name: self.chain_name,
            pricing_mode: self.pricing_mode,
            fields: TransactionV1Fields {
                args: self.args,
                entry_point: self.entry_point,
                target: self.target,
                scheduling: self.scheduling,
            },
        };
        TransactionV1 { hash: payload.compute_hash(), payload, approvals: Vec::new() }
    }
}
