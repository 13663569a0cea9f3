//! Error types for the savings wallet.
//!
//! Every wallet operation that can fail returns a [`WalletError`]. All of
//! them are terminal for the call: the wallet's state after an error is
//! exactly its state before the call.

use alloy_primitives::{Address, U256};
use savings_protocol::vault::{LedgerError, PayoutError};
use thiserror::Error;

use crate::authorization::Party;

/// Errors that can occur during wallet operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// The caller is not allowed to perform this action.
    #[error("unauthorized: {caller} may not {action}")]
    Unauthorized {
        /// Address that attempted the action.
        caller: Address,
        /// The action that was attempted.
        action: &'static str,
    },

    /// The party's daily latch is already closed for this day.
    #[error("{party} already withdrew on day {day}")]
    AlreadyWithdrawnToday {
        /// The party that tried to withdraw again.
        party: Party,
        /// The day index of the previous withdrawal.
        day: u64,
    },

    /// The Initiator has switched off the Cosigner's self-withdrawals.
    #[error("cosigner self-withdrawals are disabled")]
    PermissionDenied,

    /// The requested amount exceeds the pooled balance.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Amount requested.
        requested: U256,
        /// Pooled balance at the time of the call.
        available: U256,
    },

    /// The co-signature does not recover to the Initiator.
    #[error("invalid co-signature")]
    InvalidSignature,

    /// Deposits must carry a positive amount.
    #[error("deposit amount must be positive")]
    ZeroDeposit,

    /// An amount computation overflowed.
    #[error("amount overflow")]
    AmountOverflow,

    /// The two parties must be distinct, non-zero addresses.
    #[error("invalid parties: initiator {initiator}, cosigner {cosigner}")]
    InvalidParties {
        /// Proposed Initiator address.
        initiator: Address,
        /// Proposed Cosigner address.
        cosigner: Address,
    },

    /// A state-changing call was made from inside a payout.
    #[error("re-entrant call rejected")]
    Reentrancy,

    /// The external transfer failed; the withdrawal was rolled back.
    #[error("payout failed: {0}")]
    PayoutFailed(#[from] PayoutError),
}

impl From<LedgerError> for WalletError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                available,
                requested,
            } => WalletError::InsufficientFunds {
                requested,
                available,
            },
            LedgerError::Overflow { .. } => WalletError::AmountOverflow,
        }
    }
}
