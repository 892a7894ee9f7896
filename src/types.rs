//! Shared types for the signer core
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization between the engine, the RPC surface and the CLI.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::clvalue::DisplayValue;

// =============================================================================
// Curves
// =============================================================================

/// Supported signature curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Curve {
    Ed25519,
    Secp256k1,
}

impl Curve {
    /// Identifier used by the key-derivation host and in account-hash preimages
    pub fn as_str(&self) -> &'static str {
        match self {
            Curve::Ed25519 => "ed25519",
            Curve::Secp256k1 => "secp256k1",
        }
    }

    /// Parse a host curve identifier; anything unrecognised is `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ed25519" => Some(Curve::Ed25519),
            "secp256k1" => Some(Curve::Secp256k1),
            _ => None,
        }
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Key Types
// =============================================================================

/// Request sent to the key-derivation host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRequest {
    pub coin_type: u32,
    pub index: u32,
}

/// Raw key material returned by the key-derivation host
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    pub private_key: Vec<u8>,
    #[zeroize(skip)]
    pub public_key: Vec<u8>,
    #[zeroize(skip)]
    pub curve: String,
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &hex::encode(&self.public_key))
            .field("curve", &self.curve)
            .finish()
    }
}

/// Key material for a single sign/derive call, cleared on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey {
    #[zeroize(skip)]
    pub derivation_index: u32,
    pub private_key: Vec<u8>,
    #[zeroize(skip)]
    pub curve: Curve,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("derivation_index", &self.derivation_index)
            .field("private_key", &"[REDACTED]")
            .field("curve", &self.curve)
            .finish()
    }
}

// =============================================================================
// Transaction View
// =============================================================================

/// Ordered argument name → rendering map (declaration order is kept)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMap(Vec<(String, DisplayValue)>);

impl ArgumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new entry; a name already present keeps its first value,
    /// matching how named arguments are looked up at execution
    pub fn insert(&mut self, name: impl Into<String>, value: DisplayValue) -> bool {
        let name = name.into();
        if self.get(&name).is_some() {
            return false;
        }
        self.0.push((name, value));
        true
    }

    pub fn get(&self, name: &str) -> Option<&DisplayValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DisplayValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ArgumentMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Uniform review view over both transaction encodings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub hash: String,
    pub signing_account: String,
    pub chain_name: String,
    pub timestamp: String,
    pub ttl: String,
    /// Deploy body hash, or the canonical entry-point bytes for versioned payloads
    pub body_hash: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
    pub arguments: ArgumentMap,
}

// =============================================================================
// Confirmation
// =============================================================================

/// What the confirmation host is asked to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationRequest {
    pub title: String,
    pub origin: String,
    pub entries: Vec<(String, String)>,
}

impl ConfirmationRequest {
    pub fn for_transaction(view: &TransactionView, origin: &str) -> Self {
        let mut entries = vec![
            ("Type".to_string(), view.kind.clone()),
            ("Chain".to_string(), view.chain_name.clone()),
            ("Account".to_string(), view.signing_account.clone()),
            ("Hash".to_string(), view.hash.clone()),
            ("Timestamp".to_string(), view.timestamp.clone()),
            ("TTL".to_string(), view.ttl.clone()),
        ];
        if let Some(gas_price) = view.gas_price {
            entries.push(("Gas Price".to_string(), gas_price.to_string()));
        }
        if let Some(payment) = &view.payment {
            entries.push(("Payment".to_string(), payment.clone()));
        }
        entries.extend(view.arguments.iter().map(|(name, value)| (name.to_string(), value.to_string())));

        Self {
            title: format!("Sign {}", view.kind),
            origin: origin.to_string(),
            entries,
        }
    }

    pub fn for_message(message: &str, origin: &str) -> Self {
        Self {
            title: "Sign Message".to_string(),
            origin: origin.to_string(),
            entries: vec![("Message".to_string(), message.to_string())],
        }
    }
}

// =============================================================================
// RPC Payloads
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressResult {
    pub public_key_hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedTransactionResult {
    pub deploy: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSignatureResult {
    pub signature: String,
}

// =============================================================================
// API Response Wrapper
// =============================================================================

/// Envelope for CLI output
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<crate::error::SignerError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: crate::error::SignerError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"internal","message":"Serialization failed"}}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_parsing() {
        assert_eq!(Curve::parse("ed25519"), Some(Curve::Ed25519));
        assert_eq!(Curve::parse(" SECP256K1 "), Some(Curve::Secp256k1));
        assert_eq!(Curve::parse("p256"), None);
        assert_eq!(Curve::Secp256k1.to_string(), "secp256k1");
    }

    #[test]
    fn test_argument_map_keeps_order_and_first_value() {
        let mut args = ArgumentMap::new();
        assert!(args.insert("b", DisplayValue::text("1")));
        assert!(args.insert("a", DisplayValue::text("2")));
        assert!(!args.insert("b", DisplayValue::text("3")));
        assert_eq!(args.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(args.get("b"), Some(&DisplayValue::text("1")));

        let json = serde_json::to_string(&args).unwrap();
        assert_eq!(json, r#"{"b":"1","a":"2"}"#);
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = SigningKey {
            derivation_index: 0,
            private_key: vec![0xaa; 32],
            curve: Curve::Ed25519,
        };
        let debug = format!("{:?}", key);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("aaaa"));
    }

    #[test]
    fn test_confirmation_flattens_nested_values() {
        let mut arguments = ArgumentMap::new();
        arguments.insert(
            "ids",
            DisplayValue::List(vec![DisplayValue::text("1"), DisplayValue::text("2")]),
        );
        let view = TransactionView {
            hash: "h".into(),
            signing_account: "acct".into(),
            chain_name: "casper-test".into(),
            timestamp: "t".into(),
            ttl: "30m".into(),
            body_hash: "b".into(),
            kind: "Contract Call".into(),
            gas_price: Some(1),
            payment: None,
            arguments,
        };
        let request = ConfirmationRequest::for_transaction(&view, "https://dapp.example");
        assert_eq!(request.title, "Sign Contract Call");
        assert!(request.entries.contains(&("ids".to_string(), "[1, 2]".to_string())));
        assert!(request.entries.contains(&("Gas Price".to_string(), "1".to_string())));
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::ok("test_data".to_string());
        let json = response.to_json();
        assert!(json.contains("success"));
        assert!(json.contains("test_data"));
    }
}
