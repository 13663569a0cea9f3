//! # Recoverable Signatures
//!
//! secp256k1 ECDSA signatures in the 65-byte `r || s || v` wire form, and
//! signer recovery over a 32-byte prehash.
//!
//! Verification here is recovery: there is no public key to check against,
//! only an expected address. We recover the public key the signature
//! commits to, hash it into an address, and let the caller compare.
//!
//! ## The `v` byte
//!
//! Ethereum tooling emits `v` as 27/28; raw libsecp256k1 emits 0/1. Both
//! are accepted. Anything else is malformed.

use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use thiserror::Error;

use super::keys::{address_from_verifying_key, WalletKeypair};
use crate::config::SIGNATURE_LENGTH;

/// Errors during signature operations.
///
/// Intentionally coarse. Callers on the verification path collapse all of
/// these into a single boolean anyway.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    InvalidLength(usize),

    #[error("invalid signature encoding")]
    Malformed,

    #[error("invalid recovery byte v={0}")]
    InvalidRecoveryId(u8),

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("signing failed")]
    SigningFailed,
}

/// A 65-byte recoverable signature: `r (32) || s (32) || v (1)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    bytes: [u8; SIGNATURE_LENGTH],
}

impl RecoverableSignature {
    /// Parse a signature from raw bytes. Only the length is checked here;
    /// scalar validity is checked on recovery.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(SignatureError::InvalidLength(bytes.len()));
        }
        let mut out = [0u8; SIGNATURE_LENGTH];
        out.copy_from_slice(bytes);
        Ok(Self { bytes: out })
    }

    /// Parse a hex signature, with or without `0x`.
    pub fn from_hex(sig_hex: &str) -> Result<Self, SignatureError> {
        let trimmed = sig_hex.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = hex::decode(trimmed).map_err(|_| SignatureError::Malformed)?;
        Self::from_slice(&bytes)
    }

    /// `0x`-prefixed hex, the form wallets and block explorers display.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.bytes
    }

    /// The raw `v` byte.
    pub fn v(&self) -> u8 {
        self.bytes[64]
    }

    fn recovery_id(&self) -> Result<RecoveryId, SignatureError> {
        let v = self.v();
        let normalized = match v {
            27 | 28 => v - 27,
            0 | 1 => v,
            other => return Err(SignatureError::InvalidRecoveryId(other)),
        };
        RecoveryId::from_byte(normalized).ok_or(SignatureError::InvalidRecoveryId(v))
    }
}

impl std::fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RecoverableSignature({})", self.to_hex())
    }
}

/// Sign a 32-byte prehash. The resulting `v` is 27 or 28 and `s` is in the
/// lower half of the curve order.
pub fn sign_prehash(
    keypair: &WalletKeypair,
    digest: &B256,
) -> Result<RecoverableSignature, SignatureError> {
    let (signature, recovery_id) = keypair
        .signing_key()
        .sign_prehash_recoverable(digest.as_slice())
        .map_err(|_| SignatureError::SigningFailed)?;

    let mut bytes = [0u8; SIGNATURE_LENGTH];
    bytes[..64].copy_from_slice(&signature.to_bytes());
    bytes[64] = 27 + recovery_id.to_byte();
    Ok(RecoverableSignature { bytes })
}

/// Recover the address that produced `signature` over `digest`.
pub fn recover_address(
    digest: &B256,
    signature: &RecoverableSignature,
) -> Result<Address, SignatureError> {
    let recovery_id = signature.recovery_id()?;
    let sig = Signature::from_slice(&signature.bytes[..64]).map_err(|_| SignatureError::Malformed)?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(address_from_verifying_key(&key))
}
