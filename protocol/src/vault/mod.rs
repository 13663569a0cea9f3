//! # Vault Module — Pooled Funds
//!
//! Where the money lives. The wallet's withdrawal policy never touches a
//! balance directly; it goes through a [`Ledger`] for bookkeeping and a
//! [`Payout`] for moving funds out.
//!
//! ```text
//! ledger.rs  — Ledger trait and the in-memory PooledBalance
//! payout.rs  — Payout trait and the recording PayoutBook
//! ```
//!
//! All amounts are `U256` in base units.

pub mod ledger;
pub mod payout;

pub use ledger::{Ledger, LedgerError, PooledBalance};
pub use payout::{Payout, PayoutBook, PayoutError};
