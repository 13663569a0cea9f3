//! # Pooled Balance Ledger
//!
//! The wallet holds one pooled balance in one asset. The withdrawal policy
//! treats the ledger as an external collaborator with three operations
//! (credit, debit, balance), captured by the [`Ledger`] trait so that a
//! host can plug in its own bookkeeping. [`PooledBalance`] is the in-memory
//! implementation used by default.
//!
//! Invariant: the balance never goes negative and never wraps.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during ledger operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Attempted to debit more than the available balance.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientFunds {
        /// The current balance.
        available: U256,
        /// The amount that was requested.
        requested: U256,
    },

    /// A credit would push the balance past `U256::MAX`.
    #[error("balance overflow: current {current}, credit {credit}")]
    Overflow {
        /// The balance before the failed credit.
        current: U256,
        /// The amount that caused the overflow.
        credit: U256,
    },
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Funds-holding bookkeeping behind the wallet.
///
/// Implementations are not expected to be internally synchronized: the
/// wallet serializes every call through its own lock.
pub trait Ledger: Send {
    /// Add `amount` to the pooled balance, returning the new balance.
    fn credit(&mut self, amount: U256) -> Result<U256, LedgerError>;

    /// Remove `amount` from the pooled balance, returning the new balance.
    /// Fails without mutation if `amount` exceeds the balance.
    fn debit(&mut self, amount: U256) -> Result<U256, LedgerError>;

    /// Current pooled balance.
    fn balance(&self) -> U256;
}

// ---------------------------------------------------------------------------
// PooledBalance
// ---------------------------------------------------------------------------

/// In-memory [`Ledger`] holding a single `U256` balance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PooledBalance {
    amount: U256,
}

impl PooledBalance {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that already holds `amount`. Used when restoring a
    /// persisted wallet.
    pub fn with_balance(amount: U256) -> Self {
        Self { amount }
    }

    /// Returns `true` if the pool is empty.
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}

impl Ledger for PooledBalance {
    fn credit(&mut self, amount: U256) -> Result<U256, LedgerError> {
        let new_amount = self
            .amount
            .checked_add(amount)
            .ok_or(LedgerError::Overflow {
                current: self.amount,
                credit: amount,
            })?;
        self.amount = new_amount;
        Ok(new_amount)
    }

    fn debit(&mut self, amount: U256) -> Result<U256, LedgerError> {
        if self.amount < amount {
            return Err(LedgerError::InsufficientFunds {
                available: self.amount,
                requested: amount,
            });
        }
        self.amount -= amount;
        Ok(self.amount)
    }

    fn balance(&self) -> U256 {
        self.amount
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
