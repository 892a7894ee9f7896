use casper_signer::clvalue::{CLType, CLValue, PublicKey, TypedValue, TypedValueFormatter, WideUint};
use casper_signer::host::{SeededKeyStore, StaticConfirmation};
use casper_signer::signing::{public_key_for, sign, verify_signature};
use casper_signer::transaction::motes_to_cspr;
use casper_signer::{Curve, ErrorCode, SignatureEngine, SignerSettings, SigningKey};
use proptest::prelude::*;
use serde_json::Value;

fn leaf_value() -> impl Strategy<Value = TypedValue> {
    prop_oneof![
        any::<bool>().prop_map(TypedValue::Bool),
        any::<i32>().prop_map(TypedValue::I32),
        any::<i64>().prop_map(TypedValue::I64),
        any::<u8>().prop_map(TypedValue::U8),
        any::<u32>().prop_map(TypedValue::U32),
        any::<u64>().prop_map(TypedValue::U64),
        any::<u128>().prop_map(|v| TypedValue::U512(WideUint::from_u128(v))),
        "[a-z0-9 ]{1,12}".prop_map(TypedValue::String),
        prop::collection::vec(any::<u8>(), 1..33).prop_map(TypedValue::ByteArray),
        prop::array::uniform32(any::<u8>()).prop_map(|k| TypedValue::PublicKey(Some(PublicKey::Ed25519(k)))),
        Just(TypedValue::Unit),
        Just(TypedValue::Option { inner_type: CLType::U64, value: None }),
        Just(TypedValue::Map { key_type: CLType::String, value_type: CLType::U8, entries: vec![] }),
    ]
}

fn any_value() -> impl Strategy<Value = TypedValue> {
    leaf_value().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4)
                .prop_map(|items| TypedValue::List { element_type: CLType::U8, items }),
            inner.clone().prop_map(|v| TypedValue::Option { inner_type: CLType::U8, value: Some(Box::new(v)) }),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| TypedValue::Tuple2(Box::new(a), Box::new(b))),
            prop::collection::vec(("[a-z]{1,6}", inner.clone()), 0..3).prop_map(|pairs| TypedValue::Map {
                key_type: CLType::String,
                value_type: CLType::U8,
                entries: pairs.into_iter().map(|(k, v)| (TypedValue::String(k), v)).collect(),
            }),
            (any::<bool>(), inner).prop_map(|(is_ok, v)| TypedValue::Result {
                ok_type: CLType::U8,
                err_type: CLType::String,
                is_ok,
                value: Box::new(v),
            }),
        ]
    })
}

fn numeric_type() -> impl Strategy<Value = CLType> {
    prop_oneof![
        Just(CLType::Bool),
        Just(CLType::U8),
        Just(CLType::U32),
        Just(CLType::U64),
        Just(CLType::I32),
        Just(CLType::I64),
        Just(CLType::U512),
    ]
}

fn expected_cspr(motes: u64) -> String {
    let whole = motes / 1_000_000_000;
    let frac = motes % 1_000_000_000;
    if frac == 0 {
        format!("{} CSPR", whole)
    } else {
        let digits = format!("{:09}", frac);
        format!("{}.{} CSPR", whole, digits.trim_end_matches('0'))
    }
}

proptest! {
    #[test]
    fn formatting_is_total_and_idempotent(value in any_value()) {
        let first = TypedValueFormatter::format(&value);
        let second = TypedValueFormatter::format(&value);
        prop_assert_eq!(&first, &second);
        prop_assert!(!first.to_string().is_empty());
    }

    #[test]
    fn arbitrary_argument_bytes_never_fail(cl_type in numeric_type(), bytes in prop::collection::vec(any::<u8>(), 1..40)) {
        let value = CLValue { cl_type, bytes, parsed: Value::Null };
        let rendered = TypedValueFormatter::format(&value.decode());
        prop_assert!(!rendered.to_string().is_empty());
    }

    #[test]
    fn motes_conversion_is_exact(motes in any::<u64>()) {
        prop_assert_eq!(motes_to_cspr(&motes.to_string()), expected_cspr(motes));
    }

    #[test]
    fn malformed_motes_render_zero(text in "[0-9]{0,5}[a-z.\\-][0-9a-z]{0,5}") {
        prop_assert_eq!(motes_to_cspr(&text), "0");
    }

    #[test]
    fn both_curves_sign_and_verify(secret in prop::array::uniform32(any::<u8>()), message in prop::collection::vec(any::<u8>(), 0..64)) {
        for curve in [Curve::Ed25519, Curve::Secp256k1] {
            let key = SigningKey { derivation_index: 0, private_key: secret.to_vec(), curve };
            // out-of-range secp256k1 scalars are rejected as keys, never signed with
            let Ok(public_key) = public_key_for(curve, &key.private_key) else {
                prop_assert_eq!(curve, Curve::Secp256k1);
                continue;
            };
            let signature = sign(&key, &message).unwrap();
            prop_assert_eq!(signature.curve(), curve);
            prop_assert!(verify_signature(&public_key, &message, &signature).is_ok());
        }
    }

    #[test]
    fn unknown_curves_are_rejected(curve in "[a-z0-9]{1,10}") {
        prop_assume!(Curve::parse(&curve).is_none());

        let engine = SignatureEngine::new(
            SeededKeyStore::with_curve_id(vec![1u8; 32], curve.clone()),
            StaticConfirmation::approve_all(),
            SignerSettings::default(),
        );
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let err = runtime.block_on(engine.sign_message("hi", "proptest", 0)).unwrap_err();
        prop_assert_eq!(err.code, ErrorCode::UnsupportedCurve);
        prop_assert!(err.message.contains(&curve));
    }
}
