//! # Cryptographic Primitives
//!
//! Keccak-256, secp256k1 keys, and recoverable ECDSA signatures: the
//! Ethereum stack, because the co-signature on a joint withdrawal has to
//! be something an ordinary wallet can produce.
//!
//! Everything here is a thin, type-safe wrapper around `k256` and `sha3`.
//! We don't roll our own.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{keccak256, keccak256_multi, personal_message_hash};
pub use keys::{address_from_verifying_key, KeyError, WalletKeypair};
pub use signatures::{recover_address, sign_prehash, RecoverableSignature, SignatureError};
