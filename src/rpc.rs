//! Inbound operation surface
//!
//! | method | params | result |
//! |---|---|---|
//! | `get-address` | `derivationIndex` | `{publicKeyHex}` |
//! | `sign-transaction` | `transaction` (or `deploy`), `derivationIndex` | `{deploy}` or `false` |
//! | `sign-message` | `message`, `derivationIndex` | `{signature}` or `false` |
//!
//! Method names are also accepted in camelCase and with a `casper_` prefix.
//! Failures of a known method come back as `{error: message}`; an unknown
//! method is the only `Err`.

use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;

use crate::error::{SignerError, SignerResult};
use crate::host::{ConfirmationPrompt, KeyDerivation};
use crate::signing::{SignOutcome, SignatureEngine};
use crate::types::{AddressResult, MessageSignatureResult, SignedTransactionResult};
use crate::utils::{first_field, get_json_i64, get_json_string, parse_json_value};
use crate::{log_debug, log_warn};

pub const DEFAULT_DERIVATION_INDEX: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GetAddress,
    SignTransaction,
    SignMessage,
}

impl Method {
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix("casper_").unwrap_or(name);
        match name {
            "get-address" | "getAddress" | "get_address" => Some(Method::GetAddress),
            "sign-transaction" | "signTransaction" | "sign_transaction" | "sign-deploy" | "signDeploy" => {
                Some(Method::SignTransaction)
            }
            "sign-message" | "signMessage" | "sign_message" => Some(Method::SignMessage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GetAddress => "get-address",
            Method::SignTransaction => "sign-transaction",
            Method::SignMessage => "sign-message",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct RpcHandler<K, C> {
    engine: SignatureEngine<K, C>,
}

impl<K: KeyDerivation, C: ConfirmationPrompt> RpcHandler<K, C> {
    pub fn new(engine: SignatureEngine<K, C>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &SignatureEngine<K, C> {
        &self.engine
    }

    /// Route one request
    pub async fn handle(&self, method: &str, origin: &str, params: &Value) -> SignerResult<Value> {
        let method = Method::parse(method).ok_or_else(|| {
            log_warn!("rpc", "Unknown method", method = method, origin = origin);
            SignerError::method_not_found(method)
        })?;
        log_debug!("rpc", "Handling request", method = method, origin = origin);

        let result = match method {
            Method::GetAddress => self.get_address(params).await,
            Method::SignTransaction => self.sign_transaction(origin, params).await,
            Method::SignMessage => self.sign_message(origin, params).await,
        };

        Ok(result.unwrap_or_else(|e| {
            log_warn!("rpc", "Request failed", method = method, error = e);
            json!({ "error": e.message })
        }))
    }

    async fn get_address(&self, params: &Value) -> SignerResult<Value> {
        let index = derivation_index(params)?;
        let public_key = self.engine.get_address(index).await?;
        to_value(AddressResult { public_key_hex: public_key.to_hex() })
    }

    async fn sign_transaction(&self, origin: &str, params: &Value) -> SignerResult<Value> {
        let index = derivation_index(params)?;
        let raw = first_field(params, &["transaction", "deploy"])
            .ok_or_else(|| SignerError::invalid_params("Missing transaction"))?;

        // Hosts sometimes pass the transaction JSON as a string
        let parsed;
        let raw = match raw {
            Value::String(text) => {
                parsed = parse_json_value(text)?;
                &parsed
            }
            other => other,
        };

        match self.engine.sign_transaction(raw, origin, index).await? {
            SignOutcome::Signed(transaction) => to_value(SignedTransactionResult { deploy: transaction.to_json()? }),
            SignOutcome::Declined => Ok(Value::Bool(false)),
        }
    }

    async fn sign_message(&self, origin: &str, params: &Value) -> SignerResult<Value> {
        let index = derivation_index(params)?;
        let message = get_json_string(params, "message")
            .ok_or_else(|| SignerError::invalid_params("Missing message"))?;

        match self.engine.sign_message(&message, origin, index).await? {
            SignOutcome::Signed(signature) => to_value(MessageSignatureResult {
                signature: hex::encode(signature.raw_bytes()),
            }),
            SignOutcome::Declined => Ok(Value::Bool(false)),
        }
    }
}

/// `derivationIndex`, defaulting to 0; negative values pass through so the
/// engine can reject them as a key-derivation error
fn derivation_index(params: &Value) -> SignerResult<i64> {
    match params.get("derivationIndex") {
        None | Some(Value::Null) => Ok(DEFAULT_DERIVATION_INDEX),
        Some(raw) => get_json_i64(params, "derivationIndex")
            .ok_or_else(|| SignerError::invalid_params(format!("derivationIndex must be an integer, got {}", raw))),
    }
}

fn to_value<T: Serialize>(result: T) -> SignerResult<Value> {
    Ok(serde_json::to_value(result)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignerSettings;
    use crate::host::{SeededKeyStore, StaticConfirmation};
    use crate::types::Curve;

    fn handler(approve: bool) -> RpcHandler<SeededKeyStore, StaticConfirmation> {
        let prompt = if approve { StaticConfirmation::approve_all() } else { StaticConfirmation::decline_all() };
        RpcHandler::new(SignatureEngine::new(
            SeededKeyStore::new(vec![1u8; 32], Curve::Secp256k1),
            prompt,
            SignerSettings::default(),
        ))
    }

    #[test]
    fn test_method_names() {
        assert_eq!(Method::parse("get-address"), Some(Method::GetAddress));
        assert_eq!(Method::parse("casper_signMessage"), Some(Method::SignMessage));
        assert_eq!(Method::parse("casper_sign_transaction"), Some(Method::SignTransaction));
        assert_eq!(Method::parse("signDeploy"), Some(Method::SignTransaction));
        assert_eq!(Method::parse("transfer"), None);
    }

    #[test]
    fn test_derivation_index_param() {
        assert_eq!(derivation_index(&json!({})).unwrap(), 0);
        assert_eq!(derivation_index(&json!({ "derivationIndex": 4 })).unwrap(), 4);
        assert_eq!(derivation_index(&json!({ "derivationIndex": "7" })).unwrap(), 7);
        assert_eq!(derivation_index(&json!({ "derivationIndex": -1 })).unwrap(), -1);
        assert!(derivation_index(&json!({ "derivationIndex": 1.5 })).is_err());
        assert!(derivation_index(&json!({ "derivationIndex": true })).is_err());
    }

    #[tokio::test]
    async fn test_unknown_method_is_hard_failure() {
        let err = handler(true).handle("casper_doSomething", "test", &json!({})).await.unwrap_err();
        assert!(err.is_hard_failure());
    }

    #[tokio::test]
    async fn test_get_address_shape() {
        let result = handler(true).handle("get-address", "test", &json!({})).await.unwrap();
        let public_key = result["publicKeyHex"].as_str().unwrap();
        assert_eq!(public_key.len(), 68);
        assert!(public_key.starts_with("02"));
    }

    #[tokio::test]
    async fn test_negative_index_is_error_result() {
        let result = handler(true)
            .handle("sign-message", "test", &json!({ "message": "hi", "derivationIndex": -1 }))
            .await
            .unwrap();
        assert!(result["error"].as_str().unwrap().contains("derivation index"));
    }

    #[tokio::test]
    async fn test_sign_message_result() {
        let result = handler(true).handle("sign-message", "test", &json!({ "message": "hi" })).await.unwrap();
        assert_eq!(result["signature"].as_str().unwrap().len(), 128);

        let declined = handler(false).handle("sign-message", "test", &json!({ "message": "hi" })).await.unwrap();
        assert_eq!(declined, Value::Bool(false));
    }

    #[tokio::test]
    async fn test_missing_params_are_error_results() {
        let result = handler(true).handle("sign-transaction", "test", &json!({})).await.unwrap();
        assert_eq!(result["error"], "Missing transaction");

        let result = handler(true).handle("sign-message", "test", &json!({})).await.unwrap();
        assert_eq!(result["error"], "Missing message");
    }

    #[tokio::test]
    async fn test_malformed_transaction_is_error_result() {
        let result = handler(true)
            .handle("sign-transaction", "test", &json!({ "transaction": { "foo": 1 } }))
            .await
            .unwrap();
        assert!(result["error"].as_str().unwrap().contains("Malformed"));
    }
}
