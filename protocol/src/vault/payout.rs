//! # Payouts
//!
//! The point where withdrawn funds leave the wallet. The wallet finishes
//! its own bookkeeping (debit, daily latch) before it calls a [`Payout`],
//! and undoes that bookkeeping if the payout reports failure.
//!
//! A payout is an external call. It may run arbitrary code, including code
//! that calls back into the wallet; the wallet's re-entry guard turns any
//! such state-changing callback into an error.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use thiserror::Error;

/// Errors reported by a payout.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayoutError {
    /// The destination refused the transfer.
    #[error("payout to {destination} rejected: {reason}")]
    Rejected {
        /// Where the funds were headed.
        destination: Address,
        /// Human-readable reason from the payout backend.
        reason: String,
    },

    /// The destination's running total would overflow.
    #[error("payout overflow for {0}")]
    Overflow(Address),
}

/// External transfer of funds to a destination.
pub trait Payout: Send + Sync {
    /// Send `amount` to `destination`.
    fn send(&self, destination: Address, amount: U256) -> Result<(), PayoutError>;
}

/// In-memory payout that records every transfer per destination.
///
/// Used as the default backend and in tests to check exactly what each
/// recipient received.
#[derive(Debug, Default)]
pub struct PayoutBook {
    received: Mutex<HashMap<Address, U256>>,
    transfers: Mutex<Vec<(Address, U256)>>,
}

impl PayoutBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total paid out to `destination` so far.
    pub fn received(&self, destination: &Address) -> U256 {
        self.received
            .lock()
            .get(destination)
            .copied()
            .unwrap_or(U256::ZERO)
    }

    /// Every transfer in the order it happened.
    pub fn transfers(&self) -> Vec<(Address, U256)> {
        self.transfers.lock().clone()
    }
}

impl Payout for PayoutBook {
    fn send(&self, destination: Address, amount: U256) -> Result<(), PayoutError> {
        let mut received = self.received.lock();
        let entry = received.entry(destination).or_insert(U256::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or(PayoutError::Overflow(destination))?;
        self.transfers.lock().push((destination, amount));
        Ok(())
    }
}

/// Payouts can be shared between the wallet and an observer.
impl<P: Payout + ?Sized> Payout for std::sync::Arc<P> {
    fn send(&self, destination: Address, amount: U256) -> Result<(), PayoutError> {
        (**self).send(destination, amount)
    }
}
