//! Identifiers used throughout OpenEscrow.
//!
//! Accounts use UUIDv7. Plan ids are opaque 32-byte keys supplied by the
//! arbiter, rendered as `0x`-prefixed hex.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::EscrowError;

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// An already-authenticated account identity (arbiter, payer, recipient).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PlanId
// ---------------------------------------------------------------------------

/// Caller-supplied escrow plan key (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct PlanId(pub [u8; 32]);

impl PlanId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-digit hex key, with or without a `0x` prefix.
    ///
    /// # Errors
    /// Returns `InvalidPlan` if the text is not exactly 32 bytes of hex.
    pub fn from_hex(s: &str) -> crate::Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| EscrowError::InvalidPlan {
            reason: format!("plan id {s:?} is not hex: {e}"),
        })?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| EscrowError::InvalidPlan {
                reason: format!("plan id must be 32 bytes, got {}", b.len()),
            })?;
        Ok(Self(key))
    }

    /// Deterministic id for arbiters that don't bring their own key.
    ///
    /// The same `(arbiter, name, salt)` always yields the same id.
    #[must_use]
    pub fn derive(arbiter: AccountId, name: &str, salt: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(crate::constants::PLAN_ID_DOMAIN);
        hasher.update(arbiter.0.as_bytes());
        hasher.update((name.len() as u64).to_le_bytes());
        hasher.update(name.as_bytes());
        hasher.update(salt.to_le_bytes());
        let mut key = [0u8; 32];
        key.copy_from_slice(&hasher.finalize());
        Self(key)
    }

    /// First four bytes in hex, for compact log fields.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl FromStr for PlanId {
    type Err = EscrowError;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
