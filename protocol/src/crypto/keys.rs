//! # Key Management
//!
//! secp256k1 keypairs and the Ethereum address derivation.
//!
//! The wallet itself never holds a private key. This module exists for the
//! signer side (the CLI's `keygen` and `cosign` commands, and tests) and
//! for mapping a recovered public key back to the 20-byte address the
//! wallet compares against.
//!
//! ## Security considerations
//!
//! - Key generation uses `OsRng`.
//! - Key bytes are never logged. `Debug` prints the address only.

use std::fmt;

use alloy_primitives::Address;
use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey;
use rand::rngs::OsRng;
use thiserror::Error;

use super::hash::keccak256;

/// Errors that can occur during key operations.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid hex encoding for secret key")]
    InvalidHex,
}

/// A secp256k1 signing keypair.
///
/// Intentionally not `Serialize`. Exporting a private key should be an
/// explicit call to [`to_hex`](Self::to_hex).
///
/// # Examples
///
/// ```
/// use savings_protocol::crypto::keys::WalletKeypair;
///
/// let kp = WalletKeypair::generate();
/// let restored = WalletKeypair::from_hex(&kp.to_hex()).unwrap();
/// assert_eq!(kp.address(), restored.address());
/// ```
#[derive(Clone)]
pub struct WalletKeypair {
    signing_key: SigningKey,
}

impl WalletKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from a 32-byte big-endian secret scalar.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(secret).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex secret, with or without `0x`.
    pub fn from_hex(secret_hex: &str) -> Result<Self, KeyError> {
        let trimmed = secret_hex.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed).map_err(|_| KeyError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }

    /// Export the secret scalar as `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.to_bytes()))
    }

    /// The public verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        *self.signing_key.verifying_key()
    }

    /// The Ethereum address controlled by this key.
    pub fn address(&self) -> Address {
        address_from_verifying_key(self.signing_key.verifying_key())
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for WalletKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletKeypair")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

/// Map a public key to its address: the low 20 bytes of
/// `keccak256(x || y)` over the uncompressed point, tag byte dropped.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let point = PublicKey::from(key).to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
mod tests {
    use super::*;

    // Well-known development key (hardhat/anvil account #0).
    const DEV_KEY_0: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDR_0: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[test]
    fn test_known_address_derivation() {
        let kp = WalletKeypair::from_hex(DEV_KEY_0).unwrap();
        let expected: Address = DEV_ADDR_0.parse().unwrap();
        assert_eq!(kp.address(), expected);
    }

    #[test]
    fn test_hex_roundtrip() {
        let kp = WalletKeypair::generate();
        let restored = WalletKeypair::from_hex(&kp.to_hex()).unwrap();
        assert_eq!(kp.address(), restored.address());
    }

    #[test]
    fn test_hex_without_prefix() {
        let kp = WalletKeypair::from_hex(DEV_KEY_0.trim_start_matches("0x")).unwrap();
        assert_eq!(kp.address(), DEV_ADDR_0.parse::<Address>().unwrap());
    }

    #[test]
    fn test_zero_scalar_rejected() {
        assert!(matches!(
            WalletKeypair::from_bytes(&[0u8; 32]),
            Err(KeyError::InvalidSecretKey)
        ));
    }

    #[test]
    fn test_garbage_hex_rejected() {
        assert!(matches!(
            WalletKeypair::from_hex("0xnot-hex"),
            Err(KeyError::InvalidHex)
        ));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let kp = WalletKeypair::from_hex(DEV_KEY_0).unwrap();
        let rendered = format!("{:?}", kp);
        assert!(!rendered.contains("ac0974be"));
    }

    #[test]
    fn test_distinct_keys_distinct_addresses() {
        let a = WalletKeypair::generate();
        let b = WalletKeypair::generate();
        assert_ne!(a.address(), b.address());
    }
}
