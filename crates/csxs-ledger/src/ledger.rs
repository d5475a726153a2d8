//! Token ledger
//!
//! [`TokenLedger`] holds the authoritative balance map, the governance owner
//! and the purchase rate. Each mutating call runs as one transaction under the
//! state write lock: every precondition is checked before anything is
//! written, so a failed call leaves no trace. The event for a committed call
//! is journaled inside the same critical section and delivered to observers
//! after the lock is released.

use crate::address::Address;
use crate::config::LedgerConfig;
use crate::errors::{LedgerError, Result};
use crate::events::{EventRecord, LedgerEvent, LedgerObserver};
use crate::units::tokens_for_payment;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Descriptive token metadata, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Human-readable name
    pub name: String,
    /// Ticker symbol
    pub symbol: String,
    /// Display decimals
    pub decimals: u8,
}

/// Where the supply currently sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyAudit {
    /// Supply minted at construction
    pub total_supply: u64,
    /// Sum of every balance, pool included
    pub circulating: u64,
    /// Pool balance
    pub pool: u64,
}

impl SupplyAudit {
    /// Whether balances still add up to the minted supply
    pub fn is_balanced(&self) -> bool {
        self.circulating == self.total_supply
    }
}

#[derive(Debug)]
struct LedgerState {
    owner: Address,
    rate: u64,
    balances: BTreeMap<Address, u64>,
    journal: Vec<EventRecord>,
}

impl LedgerState {
    fn balance(&self, address: &Address) -> u64 {
        self.balances.get(address).copied().unwrap_or(0)
    }

    // u128 so that a corrupted map cannot wrap the sum
    fn circulating(&self) -> u128 {
        self.balances.values().map(|b| u128::from(*b)).sum()
    }

    fn append(&mut self, event: LedgerEvent) -> EventRecord {
        let record = EventRecord {
            sequence: self.journal.len() as u64 + 1,
            event,
        };
        self.journal.push(record.clone());
        record
    }
}

/// In-memory token ledger with single-owner governance
pub struct TokenLedger {
    metadata: TokenMetadata,
    pool: Address,
    total_supply: u64,
    state: RwLock<LedgerState>,
    observers: RwLock<Vec<Arc<dyn LedgerObserver>>>,
}

impl TokenLedger {
    /// Construct the standard ledger owned by `creator`.
    ///
    /// Mints 9,999,000,000 tokens to the pool and sets the rate to 270.
    ///
    /// # Errors
    /// * `LedgerError::Config` if `creator` is the zero address
    pub fn new(creator: Address) -> Result<Self> {
        Self::with_config(creator, LedgerConfig::default())
    }

    /// Construct a ledger from explicit parameters
    ///
    /// # Errors
    /// * `LedgerError::Config` if the parameters fail validation or the
    ///   creator is the zero address
    pub fn with_config(creator: Address, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        if creator.is_zero() {
            return Err(LedgerError::config("creator must be a valid address"));
        }
        Ok(Self::build(creator, config))
    }

    fn build(creator: Address, config: LedgerConfig) -> Self {
        let pool = Address::derive_contract(&creator, config.pool_nonce);
        let mut balances = BTreeMap::new();
        balances.insert(pool, config.total_supply);

        info!(
            owner = %creator,
            pool = %pool,
            supply = config.total_supply,
            rate = config.initial_rate,
            "ledger created"
        );

        Self {
            metadata: TokenMetadata {
                name: config.name,
                symbol: config.symbol,
                decimals: config.decimals,
            },
            pool,
            total_supply: config.total_supply,
            state: RwLock::new(LedgerState {
                owner: creator,
                rate: config.initial_rate,
                balances,
                journal: Vec::new(),
            }),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Current governance owner
    pub fn owner(&self) -> Address {
        self.state.read().owner
    }

    /// Tokens issued per whole currency unit
    pub fn rate(&self) -> u64 {
        self.state.read().rate
    }

    /// Supply minted at construction. Never changes.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// Balance of `address`; unknown accounts hold zero
    pub fn balance_of(&self, address: &Address) -> u64 {
        self.state.read().balance(address)
    }

    /// The ledger's own account, source of purchased tokens
    pub fn pool_address(&self) -> Address {
        self.pool
    }

    /// Token name, symbol and decimals
    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// Accounts with a non-zero balance, ordered by address
    pub fn holders(&self) -> Vec<(Address, u64)> {
        self.state
            .read()
            .balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(address, balance)| (*address, *balance))
            .collect()
    }

    /// Full event journal in commit order
    pub fn events(&self) -> Vec<EventRecord> {
        self.state.read().journal.clone()
    }

    /// Journal entries with a sequence number greater than `sequence`
    pub fn events_since(&self, sequence: u64) -> Vec<EventRecord> {
        let state = self.state.read();
        let start = usize::try_from(sequence)
            .unwrap_or(usize::MAX)
            .min(state.journal.len());
        state.journal[start..].to_vec()
    }

    /// Register an observer for events committed from now on
    pub fn subscribe(&self, observer: Arc<dyn LedgerObserver>) {
        self.observers.write().push(observer);
    }

    /// Snapshot of where the supply sits
    pub fn supply_audit(&self) -> SupplyAudit {
        let state = self.state.read();
        SupplyAudit {
            total_supply: self.total_supply,
            circulating: u64::try_from(state.circulating()).unwrap_or(u64::MAX),
            pool: state.balance(&self.pool),
        }
    }

    /// Check that balances add up to the minted supply
    ///
    /// # Errors
    /// * `LedgerError::Config` if the balances and the supply disagree
    pub fn verify_supply(&self) -> Result<SupplyAudit> {
        let audit = self.supply_audit();
        if audit.is_balanced() {
            Ok(audit)
        } else {
            Err(LedgerError::config(format!(
                "balances sum to {} but supply is {}",
                audit.circulating, audit.total_supply
            )))
        }
    }

    /// Hand ownership to `new_owner`.
    ///
    /// # Errors
    /// * `LedgerError::Unauthorized` if `caller` is not the owner
    /// * `LedgerError::InvalidArgument` if `new_owner` is absent or zero
    pub fn transfer_ownership(
        &self,
        new_owner: Option<Address>,
        caller: Address,
    ) -> Result<LedgerEvent> {
        debug!(caller = %caller, new_owner = ?new_owner, "transfer_ownership");

        self.commit(|state| {
            require_owner(state, caller)?;
            let new_owner = require_target(new_owner, "new owner")?;

            let previous_owner = std::mem::replace(&mut state.owner, new_owner);
            info!(previous = %previous_owner, new = %new_owner, "ownership transferred");
            Ok(LedgerEvent::OwnerTransferred {
                previous_owner,
                new_owner,
            })
        })
    }

    /// Set the purchase rate.
    ///
    /// # Errors
    /// * `LedgerError::Unauthorized` if `caller` is not the owner
    /// * `LedgerError::InvalidArgument` if `new_rate` is zero
    pub fn change_rate(&self, new_rate: u64, caller: Address) -> Result<LedgerEvent> {
        debug!(caller = %caller, new_rate, "change_rate");

        self.commit(|state| {
            require_owner(state, caller)?;
            if new_rate == 0 {
                return Err(LedgerError::invalid("rate must be positive"));
            }

            let previous_rate = std::mem::replace(&mut state.rate, new_rate);
            info!(previous = previous_rate, new = new_rate, "rate changed");
            Ok(LedgerEvent::RateChanged {
                previous_rate,
                new_rate,
            })
        })
    }

    /// Buy tokens for `beneficiary` with `payment` whole currency units.
    ///
    /// Moves `rate * payment` tokens from the pool to the beneficiary.
    ///
    /// # Errors
    /// * `LedgerError::InvalidArgument` if the beneficiary is absent or zero,
    ///   is the owner or the pool, if `payment` is zero, or if the token amount
    ///   overflows
    /// * `LedgerError::InsufficientPool` if the pool cannot cover the amount
    pub fn buy_tokens(
        &self,
        beneficiary: Option<Address>,
        caller: Address,
        payment: u64,
    ) -> Result<LedgerEvent> {
        debug!(caller = %caller, beneficiary = ?beneficiary, payment, "buy_tokens");

        let pool = self.pool;
        self.commit(|state| {
            let beneficiary = require_target(beneficiary, "beneficiary")?;
            if beneficiary == state.owner {
                return Err(LedgerError::invalid("owner cannot be a purchase beneficiary"));
            }
            if beneficiary == pool {
                return Err(LedgerError::invalid("pool cannot be a purchase beneficiary"));
            }
            if payment == 0 {
                return Err(LedgerError::invalid("payment must be positive"));
            }

            let rate = state.rate;
            let tokens = tokens_for_payment(rate, payment)?;
            let available = state.balance(&pool);
            if available < tokens {
                return Err(LedgerError::insufficient_pool(available, tokens));
            }
            let credited = state
                .balance(&beneficiary)
                .checked_add(tokens)
                .ok_or_else(|| LedgerError::invalid("beneficiary balance overflows"))?;

            state.balances.insert(pool, available - tokens);
            state.balances.insert(beneficiary, credited);

            info!(
                purchaser = %caller,
                beneficiary = %beneficiary,
                tokens,
                rate,
                "tokens purchased"
            );
            Ok(LedgerEvent::TokenPurchase {
                purchaser: caller,
                beneficiary,
                tokens,
                buy_rate: rate,
            })
        })
    }

    fn commit<F>(&self, apply: F) -> Result<LedgerEvent>
    where
        F: FnOnce(&mut LedgerState) -> Result<LedgerEvent>,
    {
        let record = {
            let mut state = self.state.write();
            let event = apply(&mut *state).map_err(|err| {
                debug!(error = %err, "operation rejected");
                err
            })?;
            debug_assert_eq!(
                state.circulating(),
                u128::from(self.total_supply),
                "balances drifted from total supply"
            );
            state.append(event)
        };

        self.notify(&record);
        Ok(record.event)
    }

    fn notify(&self, record: &EventRecord) {
        let observers = self.observers.read().clone();
        for observer in observers {
            observer.on_event(record);
        }
    }
}

// The zero address is never a valid target, even when passed explicitly.
fn require_target(target: Option<Address>, role: &str) -> Result<Address> {
    target
        .filter(|address| !address.is_zero())
        .ok_or_else(|| LedgerError::invalid(format!("{role} must be a valid address")))
}

fn require_owner(state: &LedgerState, caller: Address) -> Result<()> {
    if caller == state.owner {
        Ok(())
    } else {
        warn!(caller = %caller, owner = %state.owner, "privileged call rejected");
        Err(LedgerError::unauthorized(caller, state.owner))
    }
}

impl fmt::Debug for TokenLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("TokenLedger")
            .field("symbol", &self.metadata.symbol)
            .field("pool", &self.pool)
            .field("owner", &state.owner)
            .field("rate", &state.rate)
            .field("total_supply", &self.total_supply)
            .field("events", &state.journal.len())
            .finish()
    }
}
