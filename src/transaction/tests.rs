use serde_json::{json, Value};

use super::builder::TransferTarget;
use super::*;
use crate::clvalue::{AccountHash, CLValue, PublicKey};
use crate::signing::{public_key_for, sign_transaction_with_key, SigningError};
use crate::types::{Curve, SigningKey};

const ACCOUNT_HEX: &str = "01aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

fn recipient_hex() -> String {
    format!("0203{}8d2f", "ab".repeat(30))
}

fn transfer_deploy_json(session: Value) -> Value {
    json!({
        "hash": "00".repeat(32),
        "header": {
            "account": ACCOUNT_HEX,
            "timestamp": "2024-01-01T00:00:00.000Z",
            "ttl": "30m",
            "gas_price": 1,
            "body_hash": "00".repeat(32),
            "dependencies": [],
            "chain_name": "casper-test"
        },
        "payment": {
            "ModuleBytes": {
                "module_bytes": "",
                "args": [["amount", { "cl_type": "U512", "bytes": "0400e1f505", "parsed": "100000000" }]]
            }
        },
        "session": session,
        "approvals": []
    })
}

fn transfer_session() -> Value {
    json!({
        "Transfer": {
            "args": [
                ["amount", { "cl_type": "U512", "bytes": "0600a0724e1809", "parsed": "10000000000000" }],
                ["target", { "cl_type": "PublicKey", "bytes": recipient_hex(), "parsed": recipient_hex() }],
                ["id", { "cl_type": { "Option": "U64" }, "bytes": "012300000000000000", "parsed": 35 }]
            ]
        }
    })
}

fn signing_key(curve: Curve, byte: u8) -> (SigningKey, PublicKey) {
    let key = SigningKey { derivation_index: 0, private_key: vec![byte; 32], curve };
    let public_key = public_key_for(curve, &key.private_key).unwrap();
    (key, public_key)
}

#[test]
fn test_transfer_deploy_view() {
    let view = TransactionDecoder::decode(&transfer_deploy_json(transfer_session())).unwrap();

    assert_eq!(view.kind, "Transfer");
    assert_eq!(view.chain_name, "casper-test");
    assert_eq!(view.signing_account, ACCOUNT_HEX);
    assert_eq!(view.payment.as_deref(), Some("0.1 CSPR"));

    let keys: Vec<&str> = view.arguments.keys().collect();
    assert_eq!(keys, vec!["Recipient", "Amount", "Motes", "Transfer ID"]);

    let text = |name: &str| view.arguments.get(name).and_then(|v| v.as_text()).unwrap().to_string();
    assert_eq!(text("Recipient"), recipient_hex());
    assert!(text("Recipient").ends_with("8d2f"));
    assert_eq!(text("Amount"), "10000 CSPR");
    assert_eq!(text("Motes"), "10000000000000");
    assert_eq!(text("Transfer ID"), "35");
}

#[test]
fn test_transfer_without_id_has_three_entries() {
    let session = json!({
        "Transfer": {
            "args": [
                ["amount", { "cl_type": "U512", "bytes": "0400e40b54", "parsed": "1410065408" }],
                ["target", { "cl_type": { "ByteArray": 32 }, "bytes": "11".repeat(32), "parsed": "11".repeat(32) }]
            ]
        }
    });
    let view = TransactionDecoder::decode(&transfer_deploy_json(session)).unwrap();

    assert_eq!(view.arguments.len(), 3);
    assert!(view.arguments.get("Transfer ID").is_none());
    // 32-byte targets are account hashes
    let recipient = view.arguments.get("Recipient").and_then(|v| v.as_text()).unwrap();
    assert_eq!(recipient, format!("account-hash-{}", "11".repeat(32)));
}

#[test]
fn test_session_kinds_and_entry_point() {
    let call = json!({
        "StoredContractByName": {
            "name": "faucet",
            "entry_point": "call_faucet",
            "args": [["target", { "cl_type": "String", "bytes": "0400000061626364", "parsed": "abcd" }]]
        }
    });
    let view = TransactionDecoder::decode(&transfer_deploy_json(call)).unwrap();
    assert_eq!(view.kind, "Contract Call");
    let keys: Vec<&str> = view.arguments.keys().collect();
    assert_eq!(keys, vec!["target", "Entry Point"]);
    assert_eq!(view.arguments.get("Entry Point").and_then(|v| v.as_text()), Some("call_faucet"));

    let package = json!({
        "StoredVersionedContractByName": {
            "name": "auction",
            "version": null,
            "entry_point": "delegate",
            "args": []
        }
    });
    let view = TransactionDecoder::decode(&transfer_deploy_json(package)).unwrap();
    assert_eq!(view.kind, "Contract Package Call");

    let wasm = json!({ "ModuleBytes": { "module_bytes": "0061736d", "args": [] } });
    let view = TransactionDecoder::decode(&transfer_deploy_json(wasm)).unwrap();
    assert_eq!(view.kind, "WASM-Based Deploy");
    assert!(view.arguments.is_empty());
}

#[test]
fn test_unknown_session_is_unparseable() {
    let session = json!({ "StoredContractByAlias": { "alias": "x", "args": [] } });
    match Transaction::from_json(&transfer_deploy_json(session)) {
        Err(TransactionError::UnparseableSessionCode { raw }) => assert!(raw.contains("StoredContractByAlias")),
        other => panic!("unexpected: {:?}", other),
    }

    let two_keys = json!({ "Transfer": { "args": [] }, "ModuleBytes": { "module_bytes": "", "args": [] } });
    assert!(matches!(
        Transaction::from_json(&transfer_deploy_json(two_keys)),
        Err(TransactionError::UnparseableSessionCode { .. })
    ));
}

#[test]
fn test_malformed_inputs() {
    assert!(matches!(Transaction::from_json(&json!({ "foo": 1 })), Err(TransactionError::Malformed(_))));
    assert!(matches!(Transaction::from_json(&json!([])), Err(TransactionError::Malformed(_))));

    let mut bad_header = transfer_deploy_json(transfer_session());
    bad_header["header"]["account"] = json!("zz");
    assert!(matches!(Transaction::from_json(&bad_header), Err(TransactionError::Malformed(_))));
}

#[test]
fn test_envelopes_are_stripped() {
    let deploy = transfer_deploy_json(transfer_session());
    for key in ["deploy", "Deploy"] {
        let mut envelope = serde_json::Map::new();
        envelope.insert(key.to_string(), deploy.clone());
        let wrapped = Value::Object(envelope);
        assert!(matches!(Transaction::from_json(&wrapped), Ok(Transaction::Deploy(_))));
    }
}

#[test]
fn test_signed_deploy_round_trips_hash() {
    let (key, account) = signing_key(Curve::Secp256k1, 0x21);
    let deploy = DeployBuilder::new(account, "casper-test")
        .timestamp(Timestamp::from_millis(1_704_067_200_000))
        .transfer(TransferTarget::AccountHash(AccountHash([7; 32])), "2500000000", Some(9))
        .unwrap()
        .build()
        .unwrap();

    let decoded = Transaction::from_json(&Transaction::Deploy(deploy).to_json().unwrap()).unwrap();
    let reported = TransactionDecoder::view(&decoded).hash;

    let signed = sign_transaction_with_key(decoded, &key, true).unwrap();
    let reparsed = Transaction::from_json(&signed.to_json().unwrap()).unwrap();

    assert_eq!(reparsed.hash().to_hex(), reported);
    assert_eq!(reparsed.compute_hash(), reparsed.hash());
    assert_eq!(reparsed.approvals().len(), 1);
    assert!(reparsed.validate(true).is_ok());
}

#[test]
fn test_signed_v1_round_trips_hash() {
    let (key, account) = signing_key(Curve::Ed25519, 0x33);
    let v1 = TransactionV1Builder::native_transfer(
        InitiatorAddr::PublicKey(account),
        "casper-test",
        TransferTarget::PublicKey(PublicKey::Ed25519([4; 32])),
        "10000000000",
        None,
    )
    .unwrap()
    .timestamp(Timestamp::from_millis(1_704_067_200_000))
    .build();

    let raw = Transaction::V1(v1).to_json().unwrap();
    let decoded = Transaction::from_json(&json!({ "Version1": raw })).unwrap();
    let view = TransactionDecoder::view(&decoded);
    assert_eq!(view.kind, "Transfer");
    assert_eq!(view.signing_account, account.to_hex());
    assert_eq!(view.arguments.get("Amount").and_then(|v| v.as_text()), Some("10 CSPR"));

    let signed = sign_transaction_with_key(decoded, &key, true).unwrap();
    let reparsed = Transaction::from_json(&signed.to_json().unwrap()).unwrap();
    assert_eq!(reparsed.hash().to_hex(), view.hash);
    assert!(reparsed.validate(true).is_ok());
}

#[test]
fn test_account_hash_initiator_matches_signer() {
    let (key, account) = signing_key(Curve::Ed25519, 0x44);
    let v1 = TransactionV1Builder::new(InitiatorAddr::AccountHash(account.to_account_hash()), "casper-test")
        .args(RuntimeArgs::new().with("amount", CLValue::u512(1)))
        .timestamp(Timestamp::from_millis(0))
        .build();

    let signed = sign_transaction_with_key(Transaction::V1(v1), &key, true).unwrap();
    assert!(signed.validate(true).is_ok());
}

#[test]
fn test_tampered_deploy_fails_post_sign_validation() {
    let (key, account) = signing_key(Curve::Ed25519, 0x55);
    let deploy = DeployBuilder::new(account, "casper-test")
        .transfer(TransferTarget::PublicKey(account), "1000000000", None)
        .unwrap()
        .build()
        .unwrap();

    let mut raw = Transaction::Deploy(deploy).to_json().unwrap();
    raw["header"]["chain_name"] = json!("casper");
    let tampered = Transaction::from_json(&raw).unwrap();

    match sign_transaction_with_key(tampered, &key, true) {
        Err(SigningError::PostSignValidationFailed { reason, transaction }) => {
            assert!(reason.contains("hash mismatch"));
            // the attempted signature is kept
            assert_eq!(transaction.approvals().len(), 1);
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[test]
fn test_resigning_replaces_approval() {
    let (key, account) = signing_key(Curve::Secp256k1, 0x66);
    let deploy = DeployBuilder::new(account, "casper-test")
        .transfer(TransferTarget::PublicKey(account), "1000000000", Some(1))
        .unwrap()
        .build()
        .unwrap();

    let once = sign_transaction_with_key(Transaction::Deploy(deploy), &key, true).unwrap();
    let twice = sign_transaction_with_key(once.clone(), &key, true).unwrap();
    assert_eq!(twice.approvals().len(), 1);
    assert_eq!(once.approvals(), twice.approvals());
}

#[test]
fn test_duplicate_argument_names_are_malformed() {
    let amount = |motes: u64| serde_json::to_value(CLValue::u64(motes)).unwrap();
    let session = json!({
        "StoredContractByName": {
            "name": "vault",
            "entry_point": "withdraw",
            "args": [["amount", amount(100_000_000_000)], ["amount", amount(1)]]
        }
    });
    match Transaction::from_json(&transfer_deploy_json(session)) {
        Err(TransactionError::Malformed(reason)) => assert!(reason.contains("'amount'")),
        other => panic!("unexpected: {:?}", other),
    }

    let mut deploy = transfer_deploy_json(transfer_session());
    deploy["payment"]["ModuleBytes"]["args"]
        .as_array_mut()
        .unwrap()
        .push(json!(["amount", amount(1)]));
    assert!(matches!(Transaction::from_json(&deploy), Err(TransactionError::Malformed(_))));
}

#[test]
fn test_entry_point_argument_name_is_reserved_for_stored_calls() {
    let session = json!({
        "StoredContractByHash": {
            "hash": "22".repeat(32),
            "entry_point": "transfer",
            "args": [["Entry Point", { "cl_type": "String", "bytes": "0400000061626364", "parsed": "abcd" }]]
        }
    });
    assert!(matches!(
        Transaction::from_json(&transfer_deploy_json(session)),
        Err(TransactionError::Malformed(_))
    ));

    // wasm sessions show no entry point line, so the name is free
    let wasm = json!({
        "ModuleBytes": {
            "module_bytes": "",
            "args": [["Entry Point", { "cl_type": "String", "bytes": "0400000061626364", "parsed": "abcd" }]]
        }
    });
    let view = TransactionDecoder::decode(&transfer_deploy_json(wasm)).unwrap();
    assert_eq!(view.arguments.get("Entry Point").and_then(|v| v.as_text()), Some("abcd"));
}

#[test]
fn test_duplicate_v1_argument_names_are_malformed() {
    let (_, account) = signing_key(Curve::Ed25519, 0x77);
    let v1 = TransactionV1Builder::new(InitiatorAddr::PublicKey(account), "casper-test")
        .args(RuntimeArgs::new().with("amount", CLValue::u512(5)))
        .timestamp(Timestamp::from_millis(0))
        .build();

    let mut raw = Transaction::V1(v1).to_json().unwrap();
    let duplicate = json!(["amount", serde_json::to_value(CLValue::u512(1)).unwrap()]);
    raw["payload"]["fields"]["args"]["Named"].as_array_mut().unwrap().push(duplicate);
    assert!(matches!(Transaction::from_json(&raw), Err(TransactionError::Malformed(_))));
}
