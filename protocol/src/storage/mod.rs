//! # Storage Module
//!
//! Persistence for a wallet instance so that its identities, latches,
//! permission flag and balance survive process restarts.
//!
//! ```text
//! db.rs — sled-backed WalletDB: one snapshot record + append-only events
//! ```

pub mod db;

pub use db::{DbError, DbResult, WalletDB};
