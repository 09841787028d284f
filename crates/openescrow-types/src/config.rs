//! Configuration for an escrow ledger instance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{constants, AccountId, EscrowError, Result};

/// Configuration for a single escrow ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// The arbiter identity. Fixed for the ledger's lifetime.
    pub arbiter: AccountId,
    /// Maximum plan name length in bytes.
    #[serde(default = "default_max_name_len")]
    pub max_name_len: usize,
    /// Re-check custody against funded plans after every mutation.
    #[serde(default = "default_verify_invariants")]
    pub verify_invariants: bool,
}

fn default_max_name_len() -> usize {
    constants::DEFAULT_MAX_NAME_LEN
}

fn default_verify_invariants() -> bool {
    constants::DEFAULT_VERIFY_INVARIANTS
}

impl LedgerConfig {
    /// Default configuration for the given arbiter.
    #[must_use]
    pub fn new(arbiter: AccountId) -> Self {
        Self {
            arbiter,
            max_name_len: constants::DEFAULT_MAX_NAME_LEN,
            verify_invariants: constants::DEFAULT_VERIFY_INVARIANTS,
        }
    }

    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    /// `Serialization` on malformed JSON, `Configuration` on invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    ///
    /// # Errors
    /// `Io` if the file can't be read, otherwise as [`LedgerConfig::from_json`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check value ranges.
    ///
    /// # Errors
    /// Returns `Configuration` if `max_name_len` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_name_len == 0 {
            return Err(EscrowError::Configuration(
                "max_name_len must be > 0".into(),
            ));
        }
        Ok(())
    }
}
