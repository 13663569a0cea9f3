//! Audit events emitted by the wallet.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Observable record of a completed wallet operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WalletEvent {
    /// Funds were added to the pool.
    Deposited { depositor: Address, amount: U256 },
    /// Funds left the pool. `initiator` is the party that made the call;
    /// for a joint withdrawal that is the Cosigner.
    Withdrawn {
        initiator: Address,
        destination: Address,
        amount: U256,
    },
}

impl WalletEvent {
    pub fn amount(&self) -> U256 {
        match self {
            WalletEvent::Deposited { amount, .. } | WalletEvent::Withdrawn { amount, .. } => *amount,
        }
    }
}
