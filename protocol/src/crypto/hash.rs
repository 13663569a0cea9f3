//! # Hashing Utilities
//!
//! Keccak-256 and the EIP-191 personal-message construction. There is
//! exactly one hash function in this crate and it is the one Ethereum
//! signers use, because the co-signature path must verify signatures
//! produced by off-the-shelf wallet software.
//!
//! ## Keccak-256 is not SHA3-256
//!
//! NIST changed the padding rule when it standardized SHA-3. Ethereum
//! shipped before that and kept the original Keccak padding. `sha3::Keccak256`
//! is the pre-standard variant; `sha3::Sha3_256` is not, and mixing them up
//! produces digests that look fine and verify nothing.

use alloy_primitives::B256;
use sha3::{Digest, Keccak256};

use crate::config::PERSONAL_MESSAGE_PREFIX;

/// Compute the Keccak-256 digest of `data`.
///
/// # Example
///
/// ```
/// use savings_protocol::crypto::keccak256;
///
/// let digest = keccak256(b"savings");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn keccak256(data: &[u8]) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    B256::from_slice(&hasher.finalize())
}

/// Hash multiple byte slices together without concatenating them first.
pub fn keccak256_multi(parts: &[&[u8]]) -> B256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    B256::from_slice(&hasher.finalize())
}

/// EIP-191 hash of a 32-byte digest:
/// `keccak256("\x19Ethereum Signed Message:\n32" || digest)`.
///
/// This is what `signMessage(getBytes(digest))` signs in ethers/viem, and
/// what OpenZeppelin's `toEthSignedMessageHash(bytes32)` reproduces on-chain.
pub fn personal_message_hash(digest: &B256) -> B256 {
    keccak256_multi(&[PERSONAL_MESSAGE_PREFIX, digest.as_slice()])
}
