//! Public keys, account hashes, URefs and global-state keys

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::bytesrepr::ByteReader;
use super::CLValueError;
use crate::types::Curve;
use crate::utils::crypto::blake2b256;

pub const ED25519_TAG: u8 = 1;
pub const SECP256K1_TAG: u8 = 2;

pub const ACCOUNT_HASH_PREFIX: &str = "account-hash-";

// =============================================================================
// Public Key
// =============================================================================

/// Tag-prefixed public key (01 = Ed25519, 02 = Secp256k1 compressed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicKey {
    Ed25519([u8; 32]),
    Secp256k1([u8; 33]),
}

impl PublicKey {
    pub fn curve(&self) -> Curve {
        match self {
            PublicKey::Ed25519(_) => Curve::Ed25519,
            PublicKey::Secp256k1(_) => Curve::Secp256k1,
        }
    }

    pub fn tag(&self) -> u8 {
        match self {
            PublicKey::Ed25519(_) => ED25519_TAG,
            PublicKey::Secp256k1(_) => SECP256K1_TAG,
        }
    }

    /// Key bytes without the tag
    pub fn raw_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(bytes) => bytes,
            PublicKey::Secp256k1(bytes) => bytes,
        }
    }

    /// Build from a curve and untagged key bytes
    pub fn from_raw(curve: Curve, raw: &[u8]) -> Result<Self, CLValueError> {
        match curve {
            Curve::Ed25519 => raw
                .try_into()
                .map(PublicKey::Ed25519)
                .map_err(|_| CLValueError::InvalidPublicKey(format!("ed25519 key must be 32 bytes, got {}", raw.len()))),
            Curve::Secp256k1 => raw
                .try_into()
                .map(PublicKey::Secp256k1)
                .map_err(|_| CLValueError::InvalidPublicKey(format!("secp256k1 key must be 33 bytes, got {}", raw.len()))),
        }
    }

    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, CLValueError> {
        match reader.u8()? {
            ED25519_TAG => Ok(PublicKey::Ed25519(reader.array()?)),
            SECP256K1_TAG => Ok(PublicKey::Secp256k1(reader.array()?)),
            tag => Err(CLValueError::InvalidPublicKey(format!("unknown key tag {}", tag))),
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(self.tag());
        out.extend_from_slice(self.raw_bytes());
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(34);
        self.write(&mut out);
        out
    }

    /// Lowercase tag-prefixed hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self, CLValueError> {
        let bytes = hex::decode(s.trim()).map_err(|e| CLValueError::InvalidHex(e.to_string()))?;
        let mut reader = ByteReader::new(&bytes);
        let key = Self::read(&mut reader)?;
        reader.finish()?;
        Ok(key)
    }

    /// blake2b256(algorithm name || 0x00 || raw key)
    pub fn to_account_hash(&self) -> AccountHash {
        let name = self.curve().as_str().as_bytes();
        let mut preimage = Vec::with_capacity(name.len() + 1 + 33);
        preimage.extend_from_slice(name);
        preimage.push(0);
        preimage.extend_from_slice(self.raw_bytes());
        AccountHash(blake2b256(&preimage))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Account Hash
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountHash(pub [u8; 32]);

impl AccountHash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse `account-hash-<hex>` (the bare hex form is accepted too)
    pub fn from_formatted_str(s: &str) -> Result<Self, CLValueError> {
        let hex_part = s.trim().strip_prefix(ACCOUNT_HASH_PREFIX).unwrap_or(s.trim());
        let bytes = hex::decode(hex_part).map_err(|e| CLValueError::InvalidHex(e.to_string()))?;
        bytes
            .try_into()
            .map(AccountHash)
            .map_err(|_| CLValueError::InvalidKey("account hash must be 32 bytes".to_string()))
    }
}

impl fmt::Display for AccountHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ACCOUNT_HASH_PREFIX, self.to_hex())
    }
}

impl Serialize for AccountHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AccountHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AccountHash::from_formatted_str(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// URef
// =============================================================================

/// Unforgeable reference: 32-byte address + access rights bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct URef {
    pub addr: [u8; 32],
    pub access_rights: u8,
}

impl URef {
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, CLValueError> {
        let addr = reader.array()?;
        let access_rights = reader.u8()?;
        if access_rights > 0b111 {
            return Err(CLValueError::InvalidKey(format!(
                "invalid access rights {:#x}",
                access_rights
            )));
        }
        Ok(URef { addr, access_rights })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.addr);
        out.push(self.access_rights);
    }
}

impl fmt::Display for URef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uref-{}-{:03o}", hex::encode(self.addr), self.access_rights)
    }
}

// =============================================================================
// Key
// =============================================================================

/// Global-state key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Account(AccountHash),
    Hash([u8; 32]),
    URef(URef),
    Transfer([u8; 32]),
    DeployInfo([u8; 32]),
    EraInfo(u64),
    Balance([u8; 32]),
    Bid(AccountHash),
    Withdraw(AccountHash),
    Dictionary([u8; 32]),
    SystemEntityRegistry,
    EraSummary,
    Unbond(AccountHash),
    ChainspecRegistry,
    ChecksumRegistry,
}

impl Key {
    fn tag(&self) -> u8 {
        match self {
            Key::Account(_) => 0,
            Key::Hash(_) => 1,
            Key::URef(_) => 2,
            Key::Transfer(_) => 3,
            Key::DeployInfo(_) => 4,
            Key::EraInfo(_) => 5,
            Key::Balance(_) => 6,
            Key::Bid(_) => 7,
            Key::Withdraw(_) => 8,
            Key::Dictionary(_) => 9,
            Key::SystemEntityRegistry => 10,
            Key::EraSummary => 11,
            Key::Unbond(_) => 12,
            Key::ChainspecRegistry => 13,
            Key::ChecksumRegistry => 14,
        }
    }

    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, CLValueError> {
        let key = match reader.u8()? {
            0 => Key::Account(AccountHash(reader.array()?)),
            1 => Key::Hash(reader.array()?),
            2 => Key::URef(URef::read(reader)?),
            3 => Key::Transfer(reader.array()?),
            4 => Key::DeployInfo(reader.array()?),
            5 => Key::EraInfo(reader.u64()?),
            6 => Key::Balance(reader.array()?),
            7 => Key::Bid(AccountHash(reader.array()?)),
            8 => Key::Withdraw(AccountHash(reader.array()?)),
            9 => Key::Dictionary(reader.array()?),
            10 => {
                reader.array::<32>()?;
                Key::SystemEntityRegistry
            }
            11 => {
                reader.array::<32>()?;
                Key::EraSummary
            }
            12 => Key::Unbond(AccountHash(reader.array()?)),
            13 => {
                reader.array::<32>()?;
                Key::ChainspecRegistry
            }
            14 => {
                reader.array::<32>()?;
                Key::ChecksumRegistry
            }
            tag => return Err(CLValueError::InvalidKey(format!("unknown key tag {}", tag))),
        };
        Ok(key)
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(self.tag());
        match self {
            Key::Account(hash) | Key::Bid(hash) | Key::Withdraw(hash) | Key::Unbond(hash) => {
                out.extend_from_slice(&hash.0)
            }
            Key::Hash(addr)
            | Key::Transfer(addr)
            | Key::DeployInfo(addr)
            | Key::Balance(addr)
            | Key::Dictionary(addr) => out.extend_from_slice(addr),
            Key::URef(uref) => uref.write(out),
            Key::EraInfo(era) => out.extend_from_slice(&era.to_le_bytes()),
            Key::SystemEntityRegistry
            | Key::EraSummary
            | Key::ChainspecRegistry
            | Key::ChecksumRegistry => out.extend_from_slice(&[0u8; 32]),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let zero = hex::encode([0u8; 32]);
        match self {
            Key::Account(hash) => write!(f, "{}", hash),
            Key::Hash(addr) => write!(f, "hash-{}", hex::encode(addr)),
            Key::URef(uref) => write!(f, "{}", uref),
            Key::Transfer(addr) => write!(f, "transfer-{}", hex::encode(addr)),
            Key::DeployInfo(addr) => write!(f, "deploy-{}", hex::encode(addr)),
            Key::EraInfo(era) => write!(f, "era-{}", era),
            Key::Balance(addr) => write!(f, "balance-{}", hex::encode(addr)),
            Key::Bid(hash) => write!(f, "bid-{}", hash.to_hex()),
            Key::Withdraw(hash) => write!(f, "withdraw-{}", hash.to_hex()),
            Key::Dictionary(addr) => write!(f, "dictionary-{}", hex::encode(addr)),
            Key::SystemEntityRegistry => write!(f, "system-contract-registry-{}", zero),
            Key::EraSummary => write!(f, "era-summary-{}", zero),
            Key::Unbond(hash) => write!(f, "unbond-{}", hash.to_hex()),
            Key::ChainspecRegistry => write!(f, "chainspec-registry-{}", zero),
            Key::ChecksumRegistry => write!(f, "checksum-registry-{}", zero),
        }
    }
}
