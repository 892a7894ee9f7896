use std::io::Write;
use std::process::{Command, Output, Stdio};

use casper_signer::transaction::Transaction;
use serde_json::Value;

const SEED: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
const RECIPIENT: &str = "0202bb58b5feca505c74edc000d8282fc556e51a1024fc8e7d7e56c6f887c5c8d5f2";

fn run_cli(args: &[&str], stdin: Option<&str>) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("casper-signer");
    let mut child = Command::new(binary_path)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("cli starts");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("write stdin");
        }
    }
    child.wait_with_output().expect("cli run completes")
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout is utf8");
    serde_json::from_str(&stdout).expect("stdout is valid json")
}

fn unsigned_transfer(extra: &[&str]) -> String {
    let mut args = vec![
        "--seed", SEED, "transfer", "--to", RECIPIENT, "--amount", "10000000000000", "--id", "35",
        "--timestamp", "2024-01-01T00:00:00Z",
    ];
    args.extend_from_slice(extra);
    let output = run_cli(&args, None);
    assert!(output.status.success(), "transfer failed: {:?}", output);
    String::from_utf8(output.stdout).expect("stdout is utf8")
}

#[test]
fn address_is_stable_per_index() {
    let first = stdout_json(&run_cli(&["--seed", SEED, "address"], None));
    let again = stdout_json(&run_cli(&["--seed", SEED, "address", "--index", "0"], None));
    let other = stdout_json(&run_cli(&["--seed", SEED, "address", "--index", "1"], None));

    let key = first["publicKeyHex"].as_str().expect("publicKeyHex present");
    assert!(key.starts_with("01"));
    assert_eq!(key.len(), 66);
    assert_eq!(first, again);
    assert_ne!(first, other);

    let secp = stdout_json(&run_cli(&["--seed", SEED, "--curve", "secp256k1", "address"], None));
    assert_eq!(secp["publicKeyHex"].as_str().expect("publicKeyHex present").len(), 68);
}

#[test]
fn negative_index_is_an_error_result() {
    let output = run_cli(&["--seed", SEED, "address", "--index", "-1"], None);
    assert!(output.status.success());
    let result = stdout_json(&output);
    assert!(result["error"].as_str().expect("error present").contains("derivation index"));
}

#[test]
fn decode_transfer_from_stdin() {
    let unsigned = unsigned_transfer(&[]);
    let output = run_cli(&["decode"], Some(&unsigned));
    assert!(output.status.success(), "decode failed: {:?}", output);

    let response = stdout_json(&output);
    assert_eq!(response["success"], Value::Bool(true));
    let view = &response["data"];
    assert_eq!(view["kind"], "Transfer");
    assert_eq!(view["arguments"]["Recipient"], RECIPIENT);
    assert_eq!(view["arguments"]["Amount"], "10000 CSPR");
    assert_eq!(view["arguments"]["Motes"], "10000000000000");
    assert_eq!(view["arguments"]["Transfer ID"], "35");
}

#[test]
fn sign_with_yes_attaches_approval() {
    let variants: [&[&str]; 2] = [&[], &["--v1"]];
    for extra in variants {
        let unsigned = unsigned_transfer(extra);
        let output = run_cli(&["--seed", SEED, "--yes", "sign"], Some(&unsigned));
        assert!(output.status.success(), "sign failed: {:?}", output);

        let result = stdout_json(&output);
        let signed = Transaction::from_json(&result["deploy"]).expect("signed transaction parses");
        assert_eq!(signed.approvals().len(), 1);
        assert!(signed.validate(true).is_ok());
    }
}

#[test]
fn declined_sign_prints_false() {
    let unsigned = unsigned_transfer(&[]);
    // transaction from a file, stdin answers the prompt
    let path = std::env::temp_dir().join(format!("casper-signer-decline-{}.json", std::process::id()));
    std::fs::write(&path, &unsigned).expect("write temp file");

    let output = run_cli(&["--seed", SEED, "sign", path.to_str().expect("utf8 path")], Some("n\n"));
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success(), "sign failed: {:?}", output);
    assert_eq!(stdout_json(&output), Value::Bool(false));
}

#[test]
fn sign_and_verify_message() {
    let address = stdout_json(&run_cli(&["--seed", SEED, "address"], None));
    let public_key = address["publicKeyHex"].as_str().expect("publicKeyHex present");

    let signed = stdout_json(&run_cli(&["--seed", SEED, "--yes", "sign-message", "--message", "Hello"], None));
    let signature = signed["signature"].as_str().expect("signature present");
    assert_eq!(signature.len(), 128);

    let verified = stdout_json(&run_cli(
        &["verify-message", "--public-key", public_key, "--message", "Hello", "--signature", signature],
        None,
    ));
    assert_eq!(verified["valid"], Value::Bool(true));

    let tampered = stdout_json(&run_cli(
        &["verify-message", "--public-key", public_key, "--message", "Hello!", "--signature", signature],
        None,
    ));
    assert_eq!(tampered["valid"], Value::Bool(false));
}

#[test]
fn unknown_method_exits_with_failure() {
    let output = run_cli(&["--seed", SEED, "rpc", "casper_getBalance"], None);
    assert!(!output.status.success());

    let response = stdout_json(&output);
    assert_eq!(response["success"], Value::Bool(false));
    assert_eq!(response["error"]["code"], "method_not_found");
}

#[test]
fn missing_seed_is_rejected() {
    let output = run_cli(&["address"], None);
    assert!(!output.status.success());
    assert_eq!(stdout_json(&output)["error"]["code"], "invalid_params");
}
