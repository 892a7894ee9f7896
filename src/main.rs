//! Command line host for the Casper signer core
//!
//! Keys come from an in-process seeded key store; confirmation is read from the
//! terminal unless `--yes` is given.

use std::fs;
use std::io::{self, Read};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use casper_signer::clvalue::{AccountHash, PublicKey};
use casper_signer::host::{ConfirmationPrompt, HostError, SeededKeyStore, StaticConfirmation, TerminalPrompt};
use casper_signer::signing::verify_message;
use casper_signer::transaction::builder::TransferTarget;
use casper_signer::transaction::{DeployBuilder, InitiatorAddr, Timestamp, Transaction, TransactionV1Builder};
use casper_signer::utils::parse_hex_bytes;
use casper_signer::{
    log_debug, ApiResponse, ConfirmationRequest, Curve, RpcHandler, SignatureEngine, SignerError, SignerSettings,
    TransactionDecoder,
};

/// Casper transaction signer
#[derive(Debug, Parser)]
#[command(name = "casper-signer", version)]
struct Options {
    /// Hex seed for the in-process key store
    #[arg(long, global = true)]
    seed: Option<String>,

    /// Curve the key store derives keys on
    #[arg(long, global = true, default_value = "ed25519")]
    curve: String,

    /// Approve every confirmation without prompting
    #[arg(long, global = true)]
    yes: bool,

    /// Accept approvals from keys other than the initiator
    #[arg(long, global = true)]
    co_signer: bool,

    /// Origin reported in confirmation prompts
    #[arg(long, global = true, default_value = "casper-signer-cli")]
    origin: String,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Log accounts and hashes in full
    #[arg(long, global = true)]
    no_redact: bool,

    #[command(subcommand)]
    cmd: Actions,
}

#[derive(Debug, Subcommand)]
enum Actions {
    /// Decode a transaction (file or stdin) into its review view
    Decode {
        file: Option<String>,
    },

    /// Public key for a derivation index
    Address {
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,
    },

    /// Sign a transaction (file or stdin)
    Sign {
        file: Option<String>,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,
    },

    /// Sign a message with the "Casper Message:" prefix
    SignMessage {
        #[arg(long)]
        message: String,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,
    },

    /// Verify a message signature
    VerifyMessage {
        #[arg(long)]
        public_key: String,

        #[arg(long)]
        message: String,

        #[arg(long)]
        signature: String,
    },

    /// Build an unsigned native transfer from the key at `index`
    Transfer {
        /// Recipient public key hex or `account-hash-…`
        #[arg(long)]
        to: String,

        /// Amount in motes
        #[arg(long)]
        amount: String,

        #[arg(long)]
        id: Option<u64>,

        #[arg(long, default_value = "casper-test")]
        chain: String,

        #[arg(long, default_value_t = 0)]
        index: i64,

        /// RFC 3339 timestamp, defaults to now
        #[arg(long)]
        timestamp: Option<String>,

        /// Emit a versioned transaction instead of a legacy deploy
        #[arg(long)]
        v1: bool,
    },

    /// Call an operation by name with JSON params
    Rpc {
        method: String,

        #[arg(long, default_value = "{}")]
        params: String,
    },
}

/// Confirmation chosen on the command line
enum CliPrompt {
    Auto(StaticConfirmation),
    Terminal(TerminalPrompt),
}

#[async_trait]
impl ConfirmationPrompt for CliPrompt {
    async fn confirm(&self, request: &ConfirmationRequest) -> Result<bool, HostError> {
        match self {
            CliPrompt::Auto(prompt) => prompt.confirm(request).await,
            CliPrompt::Terminal(prompt) => prompt.confirm(request).await,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Options::parse();

    let mut settings = if args.co_signer {
        SignerSettings::co_signer()
    } else {
        SignerSettings::standard()
    };
    settings.debug_logging = args.debug;
    settings.redact_logs = !args.no_redact;
    settings.validate()?;
    settings.apply_logging();
    for warning in settings.warnings() {
        eprintln!("{}", warning);
    }

    match run(&args, settings).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", ApiResponse::<Value>::err(e.clone()).to_json());
            Err(e.into())
        }
    }
}

async fn run(args: &Options, settings: SignerSettings) -> Result<Value, SignerError> {
    log_debug!("cli", "Running command", origin = args.origin);

    match &args.cmd {
        Actions::Decode { file } => {
            let raw = read_json_input(file.as_deref())?;
            let view = TransactionDecoder::decode(&raw)?;
            Ok(serde_json::to_value(ApiResponse::ok(view))?)
        }
        Actions::VerifyMessage { public_key, message, signature } => {
            let public_key = PublicKey::from_hex(public_key)?;
            let valid = verify_message(&public_key, &settings.message_prefix, message, signature).is_ok();
            Ok(json!({ "valid": valid }))
        }
        Actions::Address { index } => {
            rpc(args, settings)?.handle("get-address", &args.origin, &json!({ "derivationIndex": index })).await
        }
        Actions::Sign { file, index } => {
            let transaction = read_json_input(file.as_deref())?;
            rpc(args, settings)?
                .handle(
                    "sign-transaction",
                    &args.origin,
                    &json!({ "transaction": transaction, "derivationIndex": index }),
                )
                .await
        }
        Actions::SignMessage { message, index } => {
            rpc(args, settings)?
                .handle("sign-message", &args.origin, &json!({ "message": message, "derivationIndex": index }))
                .await
        }
        Actions::Transfer { to, amount, id, chain, index, timestamp, v1 } => {
            let rpc = rpc(args, settings)?;
            let account = rpc.engine().get_address(*index).await?;
            let target = parse_target(to)?;
            let timestamp = match timestamp {
                Some(ts) => ts.parse::<Timestamp>()?,
                None => Timestamp::now(),
            };

            let transaction = if *v1 {
                let builder =
                    TransactionV1Builder::native_transfer(InitiatorAddr::PublicKey(account), chain, target, amount, *id)?;
                Transaction::V1(builder.timestamp(timestamp).build())
            } else {
                let deploy = DeployBuilder::new(account, chain)
                    .timestamp(timestamp)
                    .transfer(target, amount, *id)?
                    .build()?;
                Transaction::Deploy(deploy)
            };
            Ok(transaction.to_json()?)
        }
        Actions::Rpc { method, params } => {
            let params: Value = serde_json::from_str(params)?;
            rpc(args, settings)?.handle(method, &args.origin, &params).await
        }
    }
}

fn rpc(args: &Options, settings: SignerSettings) -> Result<RpcHandler<SeededKeyStore, CliPrompt>, SignerError> {
    let seed = args
        .seed
        .as_deref()
        .ok_or_else(|| SignerError::invalid_params("--seed is required for this command"))?;

    // Unknown curve identifiers are passed through so the engine reports them
    let keys = match Curve::parse(&args.curve) {
        Some(curve) => SeededKeyStore::from_hex(seed, curve)?,
        None => {
            SeededKeyStore::with_curve_id(parse_hex_bytes(seed)?, args.curve.clone())
        }
    };

    let prompt = if args.yes {
        CliPrompt::Auto(StaticConfirmation::approve_all())
    } else {
        CliPrompt::Terminal(TerminalPrompt)
    };

    Ok(RpcHandler::new(SignatureEngine::new(keys, prompt, settings)))
}

fn parse_target(to: &str) -> Result<TransferTarget, SignerError> {
    if to.starts_with("account-hash-") {
        Ok(TransferTarget::AccountHash(AccountHash::from_formatted_str(to)?))
    } else {
        Ok(TransferTarget::PublicKey(PublicKey::from_hex(to)?))
    }
}

fn read_json_input(path: Option<&str>) -> Result<Value, SignerError> {
    let payload = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| SignerError::invalid_params(format!("Cannot read {}: {}", path, e)))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| SignerError::invalid_params(format!("Cannot read stdin: {}", e)))?;
            buffer
        }
    };
    Ok(serde_json::from_str(&payload)?)
}
