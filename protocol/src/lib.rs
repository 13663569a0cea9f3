// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Savings Protocol — Core Library
//!
//! The building blocks underneath the two-party savings wallet. Nothing in
//! here knows about Alice, Bob, or daily limits; that policy lives in the
//! `savings-contracts` crate. This crate provides the primitives the policy
//! is written against.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants: day length, withdrawal rate, chain ids.
//! - **crypto** — Keccak-256, secp256k1 keys, recoverable signatures. The
//!   same primitives Ethereum tooling uses, so signatures produced by
//!   existing wallets verify here byte-for-byte.
//! - **vault** — The pooled-balance ledger and the payout seam through
//!   which funds leave the wallet.
//! - **storage** — Embedded sled persistence for wallet snapshots and the
//!   event log.
//!
//! ## Design Philosophy
//!
//! 1. All amounts are `U256` in base units. No floating point, ever.
//! 2. Every encoding that a signer depends on has a test vector.
//! 3. If it touches money, it has tests. Plural.

pub mod config;
pub mod crypto;
pub mod storage;
pub mod vault;

pub use alloy_primitives::{Address, B256, U256};
