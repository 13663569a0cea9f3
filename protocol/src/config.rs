//! # Protocol Configuration & Constants
//!
//! Every magic number the wallet depends on lives here. Some of them
//! (the message layout, the personal-message prefix) are a compatibility
//! surface shared with off-chain signers: changing them silently breaks
//! every signature already issued.

// ---------------------------------------------------------------------------
// Withdrawal Policy
// ---------------------------------------------------------------------------

/// Length of a withdrawal "day" in seconds. Day boundaries are calendar
/// boundaries of Unix time (`timestamp / SECONDS_PER_DAY`), not a rolling
/// 24h window.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Share of the pooled balance a party may take per self-withdrawal,
/// in basis points. 100 bps = 1%.
pub const SELF_WITHDRAWAL_BPS: u64 = 100;

/// Basis-point denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Base units per whole coin. Amounts are wei-denominated.
pub const BASE_UNITS_PER_COIN: u64 = 1_000_000_000_000_000_000;

// ---------------------------------------------------------------------------
// Signature Parameters
// ---------------------------------------------------------------------------

/// secp256k1 recoverable signature: `r (32) || s (32) || v (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Address width in the packed co-signature message.
pub const ADDRESS_LENGTH: usize = 20;

/// Integer width in the packed co-signature message (`uint256`).
pub const WORD_LENGTH: usize = 32;

/// `recipient || amount || contract || chain_id` packed without padding,
/// the same bytes Solidity's `abi.encodePacked(address, uint256, address, uint256)`
/// produces.
pub const PACKED_MESSAGE_LENGTH: usize = ADDRESS_LENGTH + WORD_LENGTH + ADDRESS_LENGTH + WORD_LENGTH;

/// Version of the co-signature message contract. Version 1 is the packed
/// layout above, hashed with Keccak-256 and signed as an EIP-191 personal
/// message over the 32-byte digest.
pub const MESSAGE_ENCODING_VERSION: u8 = 1;

/// EIP-191 prefix for a personal message whose body is a 32-byte digest.
pub const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Ethereum mainnet.
pub const CHAIN_ID_MAINNET: u64 = 1;

/// Sepolia testnet.
pub const CHAIN_ID_SEPOLIA: u64 = 11_155_111;

/// Local hardhat / anvil development chain.
pub const CHAIN_ID_DEVNET: u64 = 31_337;

/// Returns a friendly name for a chain id, mainly for logging.
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        CHAIN_ID_MAINNET => "mainnet".to_string(),
        CHAIN_ID_SEPOLIA => "sepolia".to_string(),
        CHAIN_ID_DEVNET => "devnet".to_string(),
        other => format!("unknown({})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ids_are_distinct() {
        assert_ne!(CHAIN_ID_MAINNET, CHAIN_ID_SEPOLIA);
        assert_ne!(CHAIN_ID_MAINNET, CHAIN_ID_DEVNET);
        assert_ne!(CHAIN_ID_SEPOLIA, CHAIN_ID_DEVNET);
    }

    #[test]
    fn test_network_name_formatting() {
        assert_eq!(network_name(CHAIN_ID_MAINNET), "mainnet");
        assert_eq!(network_name(CHAIN_ID_DEVNET), "devnet");
        assert_eq!(network_name(42), "unknown(42)");
    }

    #[test]
    fn test_withdrawal_rate_is_one_percent() {
        assert_eq!(SELF_WITHDRAWAL_BPS * 100, BPS_DENOMINATOR);
    }

    #[test]
    fn test_packed_layout_width() {
        assert_eq!(PACKED_MESSAGE_LENGTH, 104);
        assert_eq!(PERSONAL_MESSAGE_PREFIX.len(), 28);
    }
}
