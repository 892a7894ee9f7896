//! SignatureEngine
//!
//! One linear pass per call:
//! key resolved → confirmation pending → signing → attached → validated.
//! Exits: decline (`SignOutcome::Declined`), post-sign validation failure, and
//! the hard failures (key derivation, unsupported curve, malformed input).

use serde_json::Value;

use crate::clvalue::PublicKey;
use crate::config::SignerSettings;
use crate::error::SignerResult;
use crate::host::{ConfirmationPrompt, HostError, KeyDerivation};
use crate::transaction::{Approval, Signature, Transaction, TransactionDecoder};
use crate::types::{ConfirmationRequest, Curve, KeyRequest, SigningKey};
use crate::{log_debug, log_error, log_info, log_warn};

use super::{curves, message, SigningError, SigningResult};

/// Result of a call that needs user approval
#[derive(Debug, Clone, PartialEq)]
pub enum SignOutcome<T> {
    Signed(T),
    Declined,
}

impl<T> SignOutcome<T> {
    pub fn is_declined(&self) -> bool {
        matches!(self, SignOutcome::Declined)
    }

    pub fn signed(self) -> Option<T> {
        match self {
            SignOutcome::Signed(value) => Some(value),
            SignOutcome::Declined => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SignOutcome<U> {
        match self {
            SignOutcome::Signed(value) => SignOutcome::Signed(f(value)),
            SignOutcome::Declined => SignOutcome::Declined,
        }
    }
}

/// Sign the canonical hash of `transaction`, attach the approval and run
/// self-validation. On validation failure the signed transaction travels
/// inside the error.
pub fn sign_transaction_with_key(
    mut transaction: Transaction,
    key: &SigningKey,
    require_account_match: bool,
) -> SigningResult<Transaction> {
    let signer = curves::public_key_for(key.curve, &key.private_key)?;
    let hash = transaction.compute_hash();
    let signature = curves::sign(key, hash.as_bytes())?;
    log_debug!("engine", "Signed transaction hash", hash = hash, curve = key.curve);

    transaction.attach(Approval { signer, signature });
    log_debug!("engine", "Attached approval", signer = signer, approvals = transaction.approvals().len());

    match transaction.validate(require_account_match) {
        Ok(()) => {
            log_info!("engine", "Signed transaction validated", hash = hash);
            Ok(transaction)
        }
        Err(e) => {
            log_error!("engine", "Post-sign validation failed", hash = hash, reason = e);
            Err(SigningError::PostSignValidationFailed {
                reason: e.to_string(),
                transaction: Box::new(transaction),
            })
        }
    }
}

pub struct SignatureEngine<K, C> {
    keys: K,
    prompt: C,
    settings: SignerSettings,
}

impl<K: KeyDerivation, C: ConfirmationPrompt> SignatureEngine<K, C> {
    pub fn new(keys: K, prompt: C, settings: SignerSettings) -> Self {
        Self { keys, prompt, settings }
    }

    pub fn settings(&self) -> &SignerSettings {
        &self.settings
    }

    /// Public key for a derivation index
    pub async fn get_address(&self, index: i64) -> SignerResult<PublicKey> {
        let (_, public_key) = self.resolve_key(index).await?;
        log_info!("engine", "Resolved address", index = index, public_key = public_key);
        Ok(public_key)
    }

    /// Decode, confirm, sign, attach and validate
    pub async fn sign_transaction(
        &self,
        raw: &Value,
        origin: &str,
        index: i64,
    ) -> SignerResult<SignOutcome<Transaction>> {
        let (key, _) = self.resolve_key(index).await?;

        let transaction = Transaction::from_json(raw)?;
        let view = TransactionDecoder::view(&transaction);

        let request = ConfirmationRequest::for_transaction(&view, origin);
        if !self.prompt.confirm(&request).await? {
            log_info!("engine", "Transaction declined", hash = view.hash, origin = origin);
            return Ok(SignOutcome::Declined);
        }
        log_debug!("engine", "Transaction approved", hash = view.hash, origin = origin);

        let signed = sign_transaction_with_key(transaction, &key, self.settings.require_account_match)?;
        Ok(SignOutcome::Signed(signed))
    }

    /// Sign `prefix ‖ message` after confirmation
    pub async fn sign_message(&self, text: &str, origin: &str, index: i64) -> SignerResult<SignOutcome<Signature>> {
        let (key, _) = self.resolve_key(index).await?;

        let request = ConfirmationRequest::for_message(text, origin);
        if !self.prompt.confirm(&request).await? {
            log_info!("engine", "Message declined", origin = origin);
            return Ok(SignOutcome::Declined);
        }

        let signature = message::sign_message(&key, &self.settings.message_prefix, text)?;
        log_info!("engine", "Signed message", origin = origin, curve = key.curve, signature = signature);
        Ok(SignOutcome::Signed(signature))
    }

    async fn resolve_key(&self, index: i64) -> SignerResult<(SigningKey, PublicKey)> {
        let derivation_index = u32::try_from(index)
            .ok()
            .filter(|i| *i <= self.settings.max_derivation_index)
            .ok_or(HostError::InvalidDerivationIndex(index))?;

        let derived = self
            .keys
            .derive(KeyRequest { coin_type: self.settings.coin_type, index: derivation_index })
            .await?;

        let curve = Curve::parse(&derived.curve).ok_or_else(|| {
            log_warn!("engine", "Host returned an unsupported curve", curve = derived.curve);
            SigningError::UnsupportedCurve(derived.curve.clone())
        })?;

        let key = SigningKey {
            derivation_index,
            private_key: derived.private_key.clone(),
            curve,
        };
        let public_key = curves::public_key_for(curve, &key.private_key)?;

        if !derived.public_key.is_empty() && !reported_key_matches(&derived.public_key, &public_key) {
            return Err(SigningError::PublicKeyMismatch {
                reported: hex::encode(&derived.public_key),
                derived: public_key.to_hex(),
            }
            .into());
        }

        log_debug!("engine", "Resolved signing key", index = derivation_index, curve = curve);
        Ok((key, public_key))
    }
}

/// Hosts report raw, tag-prefixed or zero-padded Ed25519 keys
fn reported_key_matches(reported: &[u8], derived: &PublicKey) -> bool {
    let raw = derived.raw_bytes();
    if reported == raw || reported == derived.to_bytes().as_slice() {
        return true;
    }
    matches!(derived, PublicKey::Ed25519(_)) && reported.len() == raw.len() + 1 && reported[0] == 0 && &reported[1..] == raw
}
