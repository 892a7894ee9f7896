//! Casper Signer Core
//!
//! Transaction review and signing for the Casper network.
//!
//! # Architecture
//!
//! This crate provides:
//! - **clvalue**: typed argument values, their byte encoding and display formatting
//! - **transaction**: legacy deploys and versioned transactions behind one sum type,
//!   the review view, builders, hashing and approvals
//! - **signing**: Ed25519 / Secp256k1 signing, the `SignatureEngine` pipeline and
//!   prefixed message signatures
//! - **host**: the key-derivation and confirmation capabilities the engine is given
//! - **rpc**: `get-address`, `sign-transaction` and `sign-message` routing
//!
//! # Security
//!
//! Key material lives only for the duration of one call and is zeroized on
//! drop. Log output redacts secrets, and by default shortens accounts and hashes.
//!
//! # Example
//!
//! ```rust,ignore
//! use casper_signer::{RpcHandler, SeededKeyStore, SignatureEngine, SignerSettings, StaticConfirmation, Curve};
//!
//! let engine = SignatureEngine::new(
//!     SeededKeyStore::new(seed, Curve::Ed25519),
//!     StaticConfirmation::approve_all(),
//!     SignerSettings::default(),
//! );
//! let rpc = RpcHandler::new(engine);
//! let result = rpc.handle("sign-transaction", "dapp.example", &params).await?;
//! ```

pub mod clvalue;
pub mod config;
pub mod error;
pub mod host;
pub mod rpc;
pub mod serde_bytes;
pub mod signing;
pub mod transaction;
pub mod types;
pub mod utils;

pub use error::{ErrorCode, SignerError, SignerResult};
pub use types::*;

pub use clvalue::{CLType, CLValue, DisplayValue, PublicKey, TypedValue, TypedValueFormatter};
pub use config::SignerSettings;
pub use host::{ConfirmationPrompt, HostError, KeyDerivation, SeededKeyStore, StaticConfirmation, TerminalPrompt};
pub use rpc::{Method, RpcHandler};
pub use signing::{SignOutcome, SignatureEngine, SigningError};
pub use transaction::{Transaction, TransactionDecoder, TransactionError};
