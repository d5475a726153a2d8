//! Ledger construction parameters
//!
//! Loaded from TOML. Every field has a default, so an empty file yields the
//! standard CSXS deployment: 9,999,000,000 tokens at a rate of 270.

use crate::errors::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tokens minted to the pool at construction
pub const DEFAULT_TOTAL_SUPPLY: u64 = 9_999_000_000;
/// Tokens per whole currency unit at construction
pub const DEFAULT_RATE: u64 = 270;

const MAX_SYMBOL_LEN: usize = 11;

/// Construction parameters for a [`crate::TokenLedger`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Human-readable token name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Display decimals; balances are always integer base units
    pub decimals: u8,
    /// Rate at construction
    pub initial_rate: u64,
    /// Supply minted to the pool at construction
    pub total_supply: u64,
    /// Nonce used to derive the pool address from the creator
    pub pool_nonce: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            name: "CSXS Token".to_string(),
            symbol: "CSXS".to_string(),
            decimals: 0,
            initial_rate: DEFAULT_RATE,
            total_supply: DEFAULT_TOTAL_SUPPLY,
            pool_nonce: 0,
        }
    }
}

impl LedgerConfig {
    /// Parse a TOML document and validate it
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: LedgerConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check construction parameters
    pub fn validate(&self) -> Result<()> {
        if self.initial_rate == 0 {
            return Err(LedgerError::config("initial_rate must be positive"));
        }
        if self.total_supply == 0 {
            return Err(LedgerError::config("total_supply must be positive"));
        }
        if self.symbol.is_empty() || self.symbol.chars().count() > MAX_SYMBOL_LEN {
            return Err(LedgerError::config(format!(
                "symbol must be 1-{MAX_SYMBOL_LEN} characters"
            )));
        }
        Ok(())
    }
}
