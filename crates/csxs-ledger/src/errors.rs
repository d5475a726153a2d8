//! Ledger error type
//!
//! A single error enum covers every failure a ledger call can surface. None of
//! them are retried internally; the caller decides what to do next.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// Errors returned by ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    /// Caller lacks the privilege the operation requires
    #[error("Unauthorized: {caller} is not {required}")]
    Unauthorized {
        /// Account that attempted the call
        caller: Address,
        /// Account that holds the privilege
        required: Address,
    },

    /// Zero target, zero rate, zero payment, self-purchase or overflow
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument
        message: String,
    },

    /// Pool balance cannot cover a purchase
    #[error("Insufficient pool: available {available}, requested {requested}")]
    InsufficientPool {
        /// Pool balance at the time of the call
        available: u64,
        /// Tokens the purchase would have moved
        requested: u64,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Config error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

/// Error category, for callers that only care about the class of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`LedgerError::Unauthorized`]
    Unauthorized,
    /// See [`LedgerError::InvalidArgument`]
    InvalidArgument,
    /// See [`LedgerError::InsufficientPool`]
    InsufficientPool,
    /// See [`LedgerError::Config`]
    Config,
}

impl LedgerError {
    /// Create an unauthorized error
    pub fn unauthorized(caller: Address, required: Address) -> Self {
        Self::Unauthorized { caller, required }
    }

    /// Create an invalid argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an insufficient pool error
    pub fn insufficient_pool(available: u64, requested: u64) -> Self {
        Self::InsufficientPool {
            available,
            requested,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InsufficientPool { .. } => ErrorKind::InsufficientPool,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

/// Standard Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}
