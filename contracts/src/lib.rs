//! # Savings Wallet Policy
//!
//! Withdrawal policy for a two-party savings wallet. Alice (the Initiator)
//! and Bob (the Cosigner) share one pooled balance:
//!
//! - **Deposits** come from anyone.
//! - **Self-withdrawals** pay the caller's chosen destination 1% of the
//!   pool, at most once per day per party. Alice can turn Bob's off.
//! - **Joint withdrawals** let Bob move any amount up to the whole pool,
//!   carrying Alice's signature over the withdrawal and the wallet's
//!   identity.
//!
//! ## Design Principles
//!
//! 1. Amounts are `U256` base units and every computation is checked.
//! 2. A failed call leaves no trace: no debit, no closed latch, no event.
//! 3. Calls are serialized through one lock, and re-entry from inside a
//!    payout is rejected.
//! 4. Every persisted type is serializable (serde).

pub mod authorization;
pub mod clock;
pub mod cosign;
pub mod error;
pub mod events;
pub mod savings_wallet;

pub use authorization::{AuthorizationState, Party};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cosign::{build_message, DomainContext, JointWithdrawalRequest, SignatureVerifier};
pub use error::WalletError;
pub use events::WalletEvent;
pub use savings_wallet::{SavingsWallet, WalletSnapshot};
