//! TransactionDecoder: builds the uniform review view

use serde_json::Value;

use crate::clvalue::{CLValue, DisplayValue, TypedValue, TypedValueFormatter};
use crate::types::{ArgumentMap, TransactionView};

use super::args::RuntimeArgs;
use super::deploy::{Deploy, ExecutableDeployItem};
use super::motes::motes_to_cspr;
use super::v1::{EntryPoint, TransactionArgs, TransactionV1};
use super::{Transaction, TransactionError};

pub const ENTRY_POINT_LABEL: &str = "Entry Point";

pub struct TransactionDecoder;

impl TransactionDecoder {
    /// Parse raw JSON in either encoding and build its view
    pub fn decode(raw: &Value) -> Result<TransactionView, TransactionError> {
        let transaction = Transaction::from_json(raw)?;
        Ok(Self::view(&transaction))
    }

    pub fn view(transaction: &Transaction) -> TransactionView {
        let view = match transaction {
            Transaction::Deploy(deploy) => deploy_view(deploy),
            Transaction::V1(v1) => v1_view(v1),
        };
        crate::log_debug!(
            "decoder",
            "Decoded transaction",
            kind = view.kind,
            hash = view.hash,
            arguments = view.arguments.len()
        );
        view
    }
}

fn deploy_view(deploy: &Deploy) -> TransactionView {
    let header = &deploy.header;
    TransactionView {
        hash: deploy.hash.to_hex(),
        signing_account: header.account.to_hex(),
        chain_name: header.chain_name.clone(),
        timestamp: header.timestamp.to_string(),
        ttl: header.ttl.to_string(),
        body_hash: header.body_hash.to_hex(),
        kind: deploy.kind().label().to_string(),
        gas_price: Some(header.gas_price),
        payment: deploy.payment.args().get("amount").map(|amount| motes_to_cspr(&motes_string(amount))),
        arguments: session_arguments(&deploy.session),
    }
}

fn session_arguments(session: &ExecutableDeployItem) -> ArgumentMap {
    if session.is_transfer() {
        return transfer_arguments(session.args());
    }

    let mut arguments = formatted_arguments(session.args());
    if let Some(entry_point) = session.entry_point() {
        arguments.insert(ENTRY_POINT_LABEL, DisplayValue::text(entry_point));
    }
    arguments
}

fn v1_view(v1: &TransactionV1) -> TransactionView {
    let payload = &v1.payload;
    let entry_point = &payload.fields.entry_point;

    let arguments = match &payload.fields.args {
        TransactionArgs::Named(args) if *entry_point == EntryPoint::Transfer => transfer_arguments(args),
        TransactionArgs::Named(args) => formatted_arguments(args),
        TransactionArgs::Bytesrepr(bytes) => {
            let mut arguments = ArgumentMap::new();
            arguments.insert("Args", DisplayValue::Text(hex::encode(bytes)));
            arguments
        }
    };

    TransactionView {
        hash: v1.hash.to_hex(),
        signing_account: payload.initiator_addr.display(),
        chain_name: payload.chain_name.clone(),
        timestamp: payload.timestamp.to_string(),
        ttl: payload.ttl.to_string(),
        body_hash: hex::encode(entry_point.to_bytes()),
        kind: entry_point.label().to_string(),
        gas_price: payload.pricing_mode.gas_price(),
        payment: payload.pricing_mode.payment_amount().map(|motes| motes_to_cspr(&motes.to_string())),
        arguments,
    }
}

/// Every argument, rendered, in declaration order
fn formatted_arguments(args: &RuntimeArgs) -> ArgumentMap {
    let mut arguments = ArgumentMap::new();
    for (name, value) in args.iter() {
        arguments.insert(name, TypedValueFormatter::format(&value.decode()));
    }
    arguments
}

/// Fixed transfer layout: Recipient, Amount, Motes, and Transfer ID when present
fn transfer_arguments(args: &RuntimeArgs) -> ArgumentMap {
    let mut arguments = ArgumentMap::new();

    let recipient = args
        .get("target")
        .map(|target| TypedValueFormatter::format(&target.decode().into_account_hash_hint()))
        .unwrap_or_else(|| DisplayValue::text(""));
    arguments.insert("Recipient", recipient);

    let motes = args.get("amount").map(motes_string).unwrap_or_default();
    arguments.insert("Amount", DisplayValue::Text(motes_to_cspr(&motes)));
    arguments.insert("Motes", DisplayValue::Text(motes));

    if let Some(id) = args.get("id") {
        arguments.insert("Transfer ID", TypedValueFormatter::format(&id.decode()));
    }
    arguments
}

/// Integer string of an amount argument (U512 normally, any unsigned width accepted)
fn motes_string(value: &CLValue) -> String {
    match value.decode() {
        TypedValue::U512(v) | TypedValue::U256(v) | TypedValue::U128(v) => v.to_dec_string(),
        TypedValue::U64(v) => v.to_string(),
        TypedValue::U32(v) => v.to_string(),
        TypedValue::U8(v) => v.to_string(),
        other => TypedValueFormatter::format(&other).to_string(),
    }
}
