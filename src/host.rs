//! Host collaborators
//!
//! The engine never owns key material or user interaction. It talks to two
//! narrow capabilities supplied by the host:
//! - [`KeyDerivation`]: produce the key for a coin type and derivation index
//! - [`ConfirmationPrompt`]: show a review to the user and report the decision
//!
//! In-process implementations are provided for the CLI and for tests.

use async_trait::async_trait;
use std::io::{BufRead, Write};
use zeroize::Zeroizing;

use crate::signing::public_key_for;
use crate::types::{ConfirmationRequest, Curve, DerivedKey, KeyRequest};
use crate::utils::crypto::blake2b256;
use crate::utils::parse_hex_bytes;

/// Error types for host collaborators
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Invalid derivation index: {0}")]
    InvalidDerivationIndex(i64),

    #[error("Confirmation failed: {0}")]
    Confirmation(String),
}

#[async_trait]
pub trait KeyDerivation: Send + Sync {
    async fn derive(&self, request: KeyRequest) -> Result<DerivedKey, HostError>;
}

#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// `Ok(false)` is a decline, not a failure
    async fn confirm(&self, request: &ConfirmationRequest) -> Result<bool, HostError>;
}

// =============================================================================
// Seeded key store
// =============================================================================

const KEY_DOMAIN: &[u8] = b"casper-signer/key";
const MAX_KEY_ATTEMPTS: u32 = 16;

/// Deterministic key store: every (coin type, index) maps to a fixed key
/// derived from the seed with Blake2b-256.
pub struct SeededKeyStore {
    seed: Zeroizing<Vec<u8>>,
    curve: String,
}

impl SeededKeyStore {
    pub fn new(seed: impl Into<Vec<u8>>, curve: Curve) -> Self {
        Self::with_curve_id(seed, curve.as_str())
    }

    /// Report an arbitrary curve identifier, as a misbehaving host would
    pub fn with_curve_id(seed: impl Into<Vec<u8>>, curve: impl Into<String>) -> Self {
        Self {
            seed: Zeroizing::new(seed.into()),
            curve: curve.into(),
        }
    }

    pub fn from_hex(seed_hex: &str, curve: Curve) -> Result<Self, HostError> {
        let seed = parse_hex_bytes(seed_hex).map_err(|e| HostError::KeyDerivation(e.message))?;
        Ok(Self::new(seed, curve))
    }

    fn secret_for(&self, request: KeyRequest, attempt: u32) -> Zeroizing<[u8; 32]> {
        let mut preimage = Zeroizing::new(Vec::with_capacity(self.seed.len() + KEY_DOMAIN.len() + 12));
        preimage.extend_from_slice(KEY_DOMAIN);
        preimage.extend_from_slice(&self.seed);
        preimage.extend_from_slice(&request.coin_type.to_le_bytes());
        preimage.extend_from_slice(&request.index.to_le_bytes());
        preimage.extend_from_slice(&attempt.to_le_bytes());
        Zeroizing::new(blake2b256(&preimage))
    }
}

#[async_trait]
impl KeyDerivation for SeededKeyStore {
    async fn derive(&self, request: KeyRequest) -> Result<DerivedKey, HostError> {
        if self.seed.is_empty() {
            return Err(HostError::KeyDerivation("Key store has no seed".to_string()));
        }

        let Some(curve) = Curve::parse(&self.curve) else {
            // Unknown curves still get key bytes; rejecting them is the engine's job
            let secret = self.secret_for(request, 0);
            return Ok(DerivedKey {
                private_key: secret.to_vec(),
                public_key: Vec::new(),
                curve: self.curve.clone(),
            });
        };

        // A digest outside the secp256k1 scalar range is retried with the next counter
        for attempt in 0..MAX_KEY_ATTEMPTS {
            let secret = self.secret_for(request, attempt);
            if let Ok(public_key) = public_key_for(curve, secret.as_ref()) {
                return Ok(DerivedKey {
                    private_key: secret.to_vec(),
                    public_key: public_key.raw_bytes().to_vec(),
                    curve: curve.as_str().to_string(),
                });
            }
        }

        Err(HostError::KeyDerivation(format!(
            "No valid {} key for index {}",
            curve, request.index
        )))
    }
}

// =============================================================================
// Confirmation prompts
// =============================================================================

/// Answers every request the same way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticConfirmation {
    approve: bool,
}

impl StaticConfirmation {
    pub fn approve_all() -> Self {
        Self { approve: true }
    }

    pub fn decline_all() -> Self {
        Self { approve: false }
    }
}

#[async_trait]
impl ConfirmationPrompt for StaticConfirmation {
    async fn confirm(&self, _request: &ConfirmationRequest) -> Result<bool, HostError> {
        Ok(self.approve)
    }
}

/// Prints the review to stderr and reads `y`/`n` from stdin
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn render(request: &ConfirmationRequest) -> String {
        let entries: Vec<(String, String)> =
            request.entries.iter().map(|(label, value)| (printable(label), printable(value))).collect();
        let width = entries.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);

        let mut out = format!("\n{}\nRequested by: {}\n", printable(&request.title), printable(&request.origin));
        for (label, value) in &entries {
            out.push_str(&format!("  {:width$}  {}\n", label, value, width = width));
        }
        out.push_str("Approve? [y/N] ");
        out
    }
}

/// Escape control and bidi-override characters so caller-supplied text
/// stays on its own review line
fn printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        let invisible = matches!(c, '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2066}'..='\u{2069}');
        if c.is_control() {
            out.extend(c.escape_default());
        } else if invisible {
            out.extend(c.escape_unicode());
        } else {
            out.push(c);
        }
    }
    out
}

#[async_trait]
impl ConfirmationPrompt for TerminalPrompt {
    async fn confirm(&self, request: &ConfirmationRequest) -> Result<bool, HostError> {
        let prompt = Self::render(request);
        tokio::task::spawn_blocking(move || {
            let mut stderr = std::io::stderr();
            stderr
                .write_all(prompt.as_bytes())
                .and_then(|_| stderr.flush())
                .map_err(|e| HostError::Confirmation(e.to_string()))?;

            let mut answer = String::new();
            let read = std::io::stdin()
                .lock()
                .read_line(&mut answer)
                .map_err(|e| HostError::Confirmation(e.to_string()))?;
            if read == 0 {
                return Err(HostError::Confirmation("stdin closed".to_string()));
            }
            Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
        })
        .await
        .map_err(|e| HostError::Confirmation(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(index: u32) -> KeyRequest {
        KeyRequest { coin_type: 506, index }
    }

    #[tokio::test]
    async fn test_seeded_store_is_deterministic() {
        let store = SeededKeyStore::new(vec![9u8; 32], Curve::Ed25519);
        let a = store.derive(request(0)).await.unwrap();
        let b = store.derive(request(0)).await.unwrap();
        let c = store.derive(request(1)).await.unwrap();

        assert_eq!(a.private_key, b.private_key);
        assert_ne!(a.private_key, c.private_key);
        assert_eq!(a.public_key.len(), 32);
        assert_eq!(a.curve, "ed25519");
    }

    #[tokio::test]
    async fn test_seeded_store_secp256k1_key_is_compressed() {
        let store = SeededKeyStore::new(b"seed".to_vec(), Curve::Secp256k1);
        let key = store.derive(request(3)).await.unwrap();
        assert_eq!(key.public_key.len(), 33);
        assert!(key.public_key[0] == 2 || key.public_key[0] == 3);
    }

    #[tokio::test]
    async fn test_seeded_store_passes_unknown_curve_through() {
        let store = SeededKeyStore::with_curve_id(b"seed".to_vec(), "p256");
        let key = store.derive(request(0)).await.unwrap();
        assert_eq!(key.curve, "p256");
        assert_eq!(key.private_key.len(), 32);
    }

    #[tokio::test]
    async fn test_empty_seed_fails() {
        let store = SeededKeyStore::new(Vec::new(), Curve::Ed25519);
        assert!(matches!(store.derive(request(0)).await, Err(HostError::KeyDerivation(_))));
    }

    #[test]
    fn test_seed_hex() {
        assert!(SeededKeyStore::from_hex("0xabcd", Curve::Ed25519).is_ok());
        assert!(SeededKeyStore::from_hex("xyz", Curve::Ed25519).is_err());
    }

    #[tokio::test]
    async fn test_static_confirmation() {
        let request = ConfirmationRequest::for_message("hi", "test");
        assert!(StaticConfirmation::approve_all().confirm(&request).await.unwrap());
        assert!(!StaticConfirmation::decline_all().confirm(&request).await.unwrap());
    }

    #[test]
    fn test_terminal_render_aligns_labels() {
        let request = ConfirmationRequest {
            title: "Sign Transfer".to_string(),
            origin: "cli".to_string(),
            entries: vec![
                ("Type".to_string(), "Transfer".to_string()),
                ("Recipient".to_string(), "02ab".to_string()),
            ],
        };
        let text = TerminalPrompt::render(&request);
        assert!(text.contains("Sign Transfer"));
        assert!(text.contains("  Type       Transfer"));
        assert!(text.ends_with("[y/N] "));
    }

    #[test]
    fn test_terminal_render_escapes_injected_lines() {
        let request = ConfirmationRequest {
            title: "Sign Contract Call".to_string(),
            origin: "dapp\x1b[2J".to_string(),
            entries: vec![
                ("memo".to_string(), "hi\n  Amount  1 CSPR".to_string()),
                ("note".to_string(), "abc\u{202E}fed".to_string()),
            ],
        };
        let text = TerminalPrompt::render(&request);

        // title, origin, two entries, prompt
        assert_eq!(text.trim_start_matches('\n').lines().count(), 5);
        assert!(!text.contains('\x1b'));
        assert!(!text.contains('\u{202E}'));
        assert!(text.contains("  memo  hi\\n  Amount  1 CSPR"));
        assert!(text.contains("dapp\\u{1b}[2J"));
        assert!(text.contains("abc\\u{202e}fed"));
    }
}
