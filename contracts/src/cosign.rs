//! # Co-signed Joint Withdrawals
//!
//! A joint withdrawal moves an arbitrary amount out of the wallet in one
//! call, authorized by a signature the Initiator produced off-line. There
//! is no proposal round: the Cosigner submits the request together with
//! the Initiator's signature, and the wallet checks that the signature
//! recovers to the Initiator's address.
//!
//! ## Message encoding (version 1)
//!
//! This is a compatibility surface. Any byte difference between what the
//! signer hashed and what we hash here makes every signature fail.
//!
//! ```text
//! offset  width  field
//! 0       20     recipient address
//! 20      32     amount, uint256 big-endian
//! 52      20     wallet (contract) address
//! 72      32     chain id, uint256 big-endian
//! ```
//!
//! `digest = keccak256(message)`; the signer signs the EIP-191 personal
//! hash `keccak256("\x19Ethereum Signed Message:\n32" || digest)`. In
//! Solidity terms: `keccak256(abi.encodePacked(recipient, amount,
//! address(this), block.chainid))`, then `toEthSignedMessageHash`.
//!
//! The wallet address and chain id bind a signature to one instance on one
//! network, so a signature cannot be replayed against another deployment.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

use savings_protocol::config::{
    ADDRESS_LENGTH, MESSAGE_ENCODING_VERSION, PACKED_MESSAGE_LENGTH, WORD_LENGTH,
};
use savings_protocol::crypto::{
    keccak256, personal_message_hash, recover_address, sign_prehash, RecoverableSignature,
    SignatureError, WalletKeypair,
};

/// The instance a signature is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainContext {
    /// Address identifying this wallet instance.
    pub contract: Address,
    /// Chain id of the network the instance lives on.
    pub chain_id: u64,
}

impl DomainContext {
    pub fn new(contract: Address, chain_id: u64) -> Self {
        Self { contract, chain_id }
    }
}

/// A joint withdrawal as submitted by the Cosigner. Never stored.
#[derive(Debug, Clone)]
pub struct JointWithdrawalRequest {
    pub recipient: Address,
    pub amount: U256,
    pub signature: Vec<u8>,
}

/// Pack the four message fields in their fixed order and widths.
pub fn build_message(
    recipient: Address,
    amount: U256,
    contract: Address,
    chain_id: u64,
) -> [u8; PACKED_MESSAGE_LENGTH] {
    let mut buf = [0u8; PACKED_MESSAGE_LENGTH];
    let mut offset = 0;

    buf[offset..offset + ADDRESS_LENGTH].copy_from_slice(recipient.as_slice());
    offset += ADDRESS_LENGTH;

    buf[offset..offset + WORD_LENGTH].copy_from_slice(&amount.to_be_bytes::<32>());
    offset += WORD_LENGTH;

    buf[offset..offset + ADDRESS_LENGTH].copy_from_slice(contract.as_slice());
    offset += ADDRESS_LENGTH;

    buf[offset..offset + WORD_LENGTH]
        .copy_from_slice(&U256::from(chain_id).to_be_bytes::<32>());

    buf
}

/// Checks co-signatures for one wallet instance.
#[derive(Debug, Clone, Copy)]
pub struct SignatureVerifier {
    domain: DomainContext,
}

impl SignatureVerifier {
    pub fn new(domain: DomainContext) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> &DomainContext {
        &self.domain
    }

    /// `keccak256` of the packed message for this domain.
    pub fn message_digest(&self, recipient: Address, amount: U256) -> B256 {
        keccak256(&build_message(
            recipient,
            amount,
            self.domain.contract,
            self.domain.chain_id,
        ))
    }

    /// The prehash the signer actually signs.
    pub fn signing_digest(&self, recipient: Address, amount: U256) -> B256 {
        personal_message_hash(&self.message_digest(recipient, amount))
    }

    /// Recover who signed `request`.
    pub fn recover_signer(
        &self,
        request: &JointWithdrawalRequest,
    ) -> Result<Address, SignatureError> {
        let signature = RecoverableSignature::from_slice(&request.signature)?;
        let digest = self.signing_digest(request.recipient, request.amount);
        debug!(
            digest = %digest,
            encoding = MESSAGE_ENCODING_VERSION,
            "recovering joint withdrawal signer"
        );
        recover_address(&digest, &signature)
    }

    /// `true` iff `request.signature` recovers to `expected_signer`.
    /// Malformed signatures are a mismatch, not an error.
    pub fn verify(&self, request: &JointWithdrawalRequest, expected_signer: Address) -> bool {
        matches!(self.recover_signer(request), Ok(signer) if signer == expected_signer)
    }

    /// Produce the co-signature for a joint withdrawal. Signer-side helper.
    pub fn sign(
        &self,
        keypair: &WalletKeypair,
        recipient: Address,
        amount: U256,
    ) -> Result<RecoverableSignature, SignatureError> {
        sign_prehash(keypair, &self.signing_digest(recipient, amount))
    }
}
