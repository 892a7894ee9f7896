//! Legacy deploy format
//!
//! `hash = blake2b256(header bytes)`, and the header commits to the body via
//! `body_hash = blake2b256(payment bytes || session bytes)`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::clvalue::bytesrepr::{write_bytes, write_option_u32, write_string, write_u32, write_u64};
use crate::clvalue::PublicKey;
use crate::serde_bytes::Digest;
use crate::utils::crypto::blake2b256;

use super::approval::{self, Approval};
use super::args::RuntimeArgs;
use super::time::{TimeDiff, Timestamp};
use super::view::ENTRY_POINT_LABEL;
use super::TransactionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployHeader {
    pub account: PublicKey,
    pub timestamp: Timestamp,
    pub ttl: TimeDiff,
    pub gas_price: u64,
    pub body_hash: Digest,
    #[serde(default)]
    pub dependencies: Vec<Digest>,
    pub chain_name: String,
}

impl DeployHeader {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.account.write(&mut out);
        write_u64(&mut out, self.timestamp.millis());
        write_u64(&mut out, self.ttl.millis());
        write_u64(&mut out, self.gas_price);
        out.extend_from_slice(self.body_hash.as_bytes());
        write_u32(&mut out, self.dependencies.len() as u32);
        for dependency in &self.dependencies {
            out.extend_from_slice(dependency.as_bytes());
        }
        write_string(&mut out, &self.chain_name);
        out
    }

    pub fn compute_hash(&self) -> Digest {
        Digest(blake2b256(&self.to_bytes()))
    }
}

/// Session / payment code of a deploy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutableDeployItem {
    ModuleBytes {
        #[serde(with = "crate::serde_bytes::hex_vec")]
        module_bytes: Vec<u8>,
        args: RuntimeArgs,
    },
    StoredContractByHash {
        hash: Digest,
        entry_point: String,
        args: RuntimeArgs,
    },
    StoredContractByName {
        name: String,
        entry_point: String,
        args: RuntimeArgs,
    },
    StoredVersionedContractByHash {
        hash: Digest,
        #[serde(default)]
        version: Option<u32>,
        entry_point: String,
        args: RuntimeArgs,
    },
    StoredVersionedContractByName {
        name: String,
        #[serde(default)]
        version: Option<u32>,
        entry_point: String,
        args: RuntimeArgs,
    },
    Transfer {
        args: RuntimeArgs,
    },
}

/// Review label of a deploy session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployKind {
    Transfer,
    WasmDeploy,
    ContractCall,
    ContractPackageCall,
}

impl DeployKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeployKind::Transfer => "Transfer",
            DeployKind::WasmDeploy => "WASM-Based Deploy",
            DeployKind::ContractCall => "Contract Call",
            DeployKind::ContractPackageCall => "Contract Package Call",
        }
    }
}

impl fmt::Display for DeployKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ExecutableDeployItem {
    /// Parse an externally tagged item; the object must carry exactly one variant key
    pub fn from_json(value: &Value) -> Result<Self, String> {
        match value.as_object() {
            Some(map) if map.len() == 1 => {
                serde_json::from_value(value.clone()).map_err(|e| e.to_string())
            }
            Some(map) => Err(format!("expected one variant key, found {}", map.len())),
            None => Err("executable item must be an object".to_string()),
        }
    }

    pub fn standard_payment(motes: u64) -> Self {
        ExecutableDeployItem::ModuleBytes {
            module_bytes: Vec::new(),
            args: RuntimeArgs::new().with("amount", crate::clvalue::CLValue::u512(motes)),
        }
    }

    pub fn args(&self) -> &RuntimeArgs {
        match self {
            ExecutableDeployItem::ModuleBytes { args, .. }
            | ExecutableDeployItem::StoredContractByHash { args, .. }
            | ExecutableDeployItem::StoredContractByName { args, .. }
            | ExecutableDeployItem::StoredVersionedContractByHash { args, .. }
            | ExecutableDeployItem::StoredVersionedContractByName { args, .. }
            | ExecutableDeployItem::Transfer { args } => args,
        }
    }

    pub fn entry_point(&self) -> Option<&str> {
        match self {
            ExecutableDeployItem::StoredContractByHash { entry_point, .. }
            | ExecutableDeployItem::StoredContractByName { entry_point, .. }
            | ExecutableDeployItem::StoredVersionedContractByHash { entry_point, .. }
            | ExecutableDeployItem::StoredVersionedContractByName { entry_point, .. } => {
                Some(entry_point)
            }
            ExecutableDeployItem::ModuleBytes { .. } | ExecutableDeployItem::Transfer { .. } => None,
        }
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, ExecutableDeployItem::Transfer { .. })
    }

    pub fn is_module_bytes(&self) -> bool {
        matches!(self, ExecutableDeployItem::ModuleBytes { .. })
    }

    pub fn is_stored_contract(&self) -> bool {
        matches!(
            self,
            ExecutableDeployItem::StoredContractByHash { .. }
                | ExecutableDeployItem::StoredContractByName { .. }
        )
    }

    /// Checked in priority order: transfer, module bytes, stored family
    pub fn kind(&self) -> DeployKind {
        if self.is_transfer() {
            DeployKind::Transfer
        } else if self.is_module_bytes() {
            DeployKind::WasmDeploy
        } else if self.is_stored_contract() {
            DeployKind::ContractCall
        } else {
            DeployKind::ContractPackageCall
        }
    }

    fn tag(&self) -> u8 {
        match self {
            ExecutableDeployItem::ModuleBytes { .. } => 0,
            ExecutableDeployItem::StoredContractByHash { .. } => 1,
            ExecutableDeployItem::StoredContractByName { .. } => 2,
            ExecutableDeployItem::StoredVersionedContractByHash { .. } => 3,
            ExecutableDeployItem::StoredVersionedContractByName { .. } => 4,
            ExecutableDeployItem::Transfer { .. } => 5,
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(self.tag());
        match self {
            ExecutableDeployItem::ModuleBytes { module_bytes, args } => {
                write_bytes(out, module_bytes);
                args.write(out);
            }
            ExecutableDeployItem::StoredContractByHash { hash, entry_point, args } => {
                out.extend_from_slice(hash.as_bytes());
                write_string(out, entry_point);
                args.write(out);
            }
            ExecutableDeployItem::StoredContractByName { name, entry_point, args } => {
                write_string(out, name);
                write_string(out, entry_point);
                args.write(out);
            }
            ExecutableDeployItem::StoredVersionedContractByHash { hash, version, entry_point, args } => {
                out.extend_from_slice(hash.as_bytes());
                write_option_u32(out, *version);
                write_string(out, entry_point);
                args.write(out);
            }
            ExecutableDeployItem::StoredVersionedContractByName { name, version, entry_point, args } => {
                write_string(out, name);
                write_option_u32(out, *version);
                write_string(out, entry_point);
                args.write(out);
            }
            ExecutableDeployItem::Transfer { args } => args.write(out),
        }
    }
}

/// Argument names must be unique, and a stored call may not shadow the
/// injected entry-point review line
fn check_argument_names(item: &ExecutableDeployItem) -> Result<(), TransactionError> {
    if let Some(name) = item.args().duplicate_name() {
        return Err(TransactionError::Malformed(format!("argument '{}' is declared more than once", name)));
    }
    if item.entry_point().is_some() && item.args().get(ENTRY_POINT_LABEL).is_some() {
        return Err(TransactionError::Malformed(format!(
            "argument name '{}' is reserved for stored contract calls",
            ENTRY_POINT_LABEL
        )));
    }
    Ok(())
}

/// Legacy deploy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deploy {
    pub hash: Digest,
    pub header: DeployHeader,
    pub payment: ExecutableDeployItem,
    pub session: ExecutableDeployItem,
    pub approvals: Vec<Approval>,
}

impl Deploy {
    /// Parse the deploy JSON; an unrecognised session is reported with its raw JSON
    pub fn from_json(value: &Value) -> Result<Self, TransactionError> {
        let field = |name: &str| {
            value
                .get(name)
                .ok_or_else(|| TransactionError::Malformed(format!("deploy is missing '{}'", name)))
        };

        let header: DeployHeader = serde_json::from_value(field("header")?.clone())
            .map_err(|e| TransactionError::Malformed(format!("invalid deploy header: {}", e)))?;
        let hash: Digest = serde_json::from_value(field("hash")?.clone())
            .map_err(|e| TransactionError::Malformed(format!("invalid deploy hash: {}", e)))?;
        let payment = ExecutableDeployItem::from_json(field("payment")?)
            .map_err(|e| TransactionError::Malformed(format!("invalid payment: {}", e)))?;

        let raw_session = field("session")?;
        let session = ExecutableDeployItem::from_json(raw_session).map_err(|e| {
            crate::log_debug!("deploy", "Session did not match any variant", reason = e);
            TransactionError::UnparseableSessionCode { raw: raw_session.to_string() }
        })?;

        check_argument_names(&payment)?;
        check_argument_names(&session)?;

        let approvals: Vec<Approval> = match value.get("approvals") {
            None | Some(Value::Null) => Vec::new(),
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|e| TransactionError::Malformed(format!("invalid approvals: {}", e)))?,
        };

        Ok(Deploy { hash, header, payment, session, approvals })
    }

    pub fn compute_body_hash(&self) -> Digest {
        let mut out = Vec::new();
        self.payment.write(&mut out);
        self.session.write(&mut out);
        Digest(blake2b256(&out))
    }

    pub fn kind(&self) -> DeployKind {
        self.session.kind()
    }

    pub fn attach(&mut self, approval: Approval) {
        approval::upsert(&mut self.approvals, approval);
    }

    /// Hash-consistency check: the body hash and deploy hash both recompute
    pub fn check_hashes(&self) -> Result<(), TransactionError> {
        let body_hash = self.compute_body_hash();
        if body_hash != self.header.body_hash {
            return Err(TransactionError::Validation(format!(
                "body hash mismatch: header has {}, computed {}",
                self.header.body_hash, body_hash
            )));
        }
        let hash = self.header.compute_hash();
        if hash != self.hash {
            return Err(TransactionError::Validation(format!(
                "deploy hash mismatch: declared {}, computed {}",
                self.hash, hash
            )));
        }
        Ok(())
    }
}
