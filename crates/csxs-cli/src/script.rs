//! Operation scripts
//!
//! A script names the ledger creator and an ordered list of steps:
//!
//! ```toml
//! creator = "0x1111111111111111111111111111111111111111"
//!
//! [[step]]
//! op = "buy_tokens"
//! caller = "0x1111111111111111111111111111111111111111"
//! beneficiary = "0x2222222222222222222222222222222222222222"
//! ether = 10
//! ```
//!
//! Steps run in order. A failing step is reported and the run continues.

use csxs_ledger::{
    wei_to_whole_units, Address, LedgerError, LedgerEvent, SupplyAudit, TokenLedger,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Errors raised while loading a script
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// Script file could not be read
    #[error("failed to read script {path}: {source}")]
    Read {
        /// Script path
        path: String,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Script is not valid TOML or has the wrong shape
    #[error("failed to parse script: {0}")]
    Parse(#[from] toml::de::Error),

    /// Script names an address that does not parse
    #[error("invalid address in script: {0}")]
    Address(#[from] LedgerError),
}

/// Parsed operation script
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    /// Account that constructs the ledger
    pub creator: String,
    /// Steps in execution order
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

/// One ledger operation
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Hand ownership to `new_owner`
    TransferOwnership {
        /// Calling account
        caller: String,
        /// Target owner; the zero address is passed through as absent
        new_owner: String,
    },
    /// Set the purchase rate
    ChangeRate {
        /// Calling account
        caller: String,
        /// New rate
        rate: u64,
    },
    /// Buy tokens for `beneficiary`
    BuyTokens {
        /// Paying account
        caller: String,
        /// Credited account; the zero address is passed through as absent
        beneficiary: String,
        /// Payment in whole ether
        #[serde(default)]
        ether: Option<u64>,
        /// Payment in wei, as a decimal string
        #[serde(default)]
        wei: Option<String>,
    },
}

impl Step {
    /// Operation name as written in scripts
    pub fn op(&self) -> &'static str {
        match self {
            Step::TransferOwnership { .. } => "transfer_ownership",
            Step::ChangeRate { .. } => "change_rate",
            Step::BuyTokens { .. } => "buy_tokens",
        }
    }

    /// Run this step against `ledger`
    pub fn execute(&self, ledger: &TokenLedger) -> Result<LedgerEvent, LedgerError> {
        match self {
            Step::TransferOwnership { caller, new_owner } => {
                let caller: Address = caller.parse()?;
                ledger.transfer_ownership(Address::parse_target(new_owner)?, caller)
            }
            Step::ChangeRate { caller, rate } => ledger.change_rate(*rate, caller.parse()?),
            Step::BuyTokens {
                caller,
                beneficiary,
                ether,
                wei,
            } => {
                let caller: Address = caller.parse()?;
                let payment = payment_units(*ether, wei.as_deref())?;
                ledger.buy_tokens(Address::parse_target(beneficiary)?, caller, payment)
            }
        }
    }
}

fn payment_units(ether: Option<u64>, wei: Option<&str>) -> Result<u64, LedgerError> {
    match (ether, wei) {
        (Some(ether), None) => Ok(ether),
        (None, Some(wei)) => {
            let wei: u128 = wei
                .trim()
                .parse()
                .map_err(|e| LedgerError::invalid(format!("malformed wei amount {wei}: {e}")))?;
            wei_to_whole_units(wei)
        }
        (None, None) => Ok(0),
        (Some(_), Some(_)) => Err(LedgerError::invalid(
            "payment must be given as either ether or wei, not both",
        )),
    }
}

impl Script {
    /// Parse a script from TOML
    pub fn from_toml_str(s: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(s)?)
    }

    /// Load a script file
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Creator address
    pub fn creator(&self) -> Result<Address, ScriptError> {
        Ok(self.creator.parse()?)
    }

    /// Run every step, collecting one outcome per step
    pub fn run(&self, ledger: &TokenLedger) -> Vec<StepOutcome> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                debug!(index, op = step.op(), "running step");
                match step.execute(ledger) {
                    Ok(event) => StepOutcome {
                        index,
                        op: step.op(),
                        event: Some(event),
                        error: None,
                    },
                    Err(err) => {
                        info!(index, op = step.op(), error = %err, "step failed");
                        StepOutcome {
                            index,
                            op: step.op(),
                            event: None,
                            error: Some(err.to_string()),
                        }
                    }
                }
            })
            .collect()
    }
}

/// Result of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    /// Position in the script
    pub index: usize,
    /// Operation name
    pub op: &'static str,
    /// Event emitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<LedgerEvent>,
    /// Error message on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ledger state after a run
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSummary {
    /// Token symbol
    pub symbol: String,
    /// Current owner
    pub owner: Address,
    /// Pool account
    pub pool: Address,
    /// Current rate
    pub rate: u64,
    /// Minted supply
    pub total_supply: u64,
    /// Non-zero balances
    pub holders: Vec<Holder>,
    /// Supply breakdown
    pub audit: SupplyAudit,
}

/// One balance entry
#[derive(Debug, Clone, Serialize)]
pub struct Holder {
    /// Account
    pub address: Address,
    /// Balance in base units
    pub balance: u64,
}

impl LedgerSummary {
    /// Capture the current state of `ledger`
    pub fn capture(ledger: &TokenLedger) -> Self {
        Self {
            symbol: ledger.metadata().symbol.clone(),
            owner: ledger.owner(),
            pool: ledger.pool_address(),
            rate: ledger.rate(),
            total_supply: ledger.total_supply(),
            holders: ledger
                .holders()
                .into_iter()
                .map(|(address, balance)| Holder { address, balance })
                .collect(),
            audit: ledger.supply_audit(),
        }
    }
}
