//! # CLI Interface
//!
//! Defines the command-line argument structure for `savings-wallet` using
//! `clap` derive. One wallet lives in one data directory; every subcommand
//! other than `keygen` operates on that wallet.

use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, U256};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Two-party savings wallet.
///
/// Alice (the Initiator) and Bob (the Cosigner) share one pooled balance.
/// Each may take 1% of it per day; Bob can take any amount with Alice's
/// signature.
#[derive(Parser, Debug)]
#[command(
    name = "savings-wallet",
    about = "Two-party savings wallet",
    version,
    propagate_version = true
)]
pub struct SavingsCli {
    /// Directory holding the wallet database. Created by `init`.
    #[arg(
        long,
        short = 'd',
        env = "SAVINGS_DATA_DIR",
        default_value = ".savings-wallet",
        global = true
    )]
    pub data_dir: PathBuf,

    /// Log output format: `pretty` or `json`.
    #[arg(long, env = "SAVINGS_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh secp256k1 keypair and print its address.
    Keygen,
    /// Create a new wallet for two parties.
    Init(InitArgs),
    /// Add funds to the pool. Anyone may deposit.
    Deposit(DepositArgs),
    /// Take today's 1% self-withdrawal.
    Withdraw(WithdrawArgs),
    /// Enable or disable the Cosigner's self-withdrawals (Initiator only).
    SetPermission(SetPermissionArgs),
    /// Produce the Initiator's co-signature for a joint withdrawal.
    Cosign(CosignArgs),
    /// Submit a co-signed joint withdrawal (Cosigner only).
    JointWithdraw(JointWithdrawArgs),
    /// Show balances, permissions and today's withdrawal availability.
    Status,
    /// Print the event log as JSON lines.
    Events,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Initiator (Alice) address.
    #[arg(long)]
    pub initiator: Address,

    /// Cosigner (Bob) address.
    #[arg(long)]
    pub cosigner: Address,

    /// Chain id the co-signatures are bound to.
    #[arg(long, default_value_t = savings_protocol::config::CHAIN_ID_DEVNET)]
    pub chain_id: u64,

    /// Address identifying this wallet instance.
    ///
    /// When omitted, one is derived from the two parties and the chain id.
    #[arg(long)]
    pub contract: Option<Address>,
}

/// Arguments for the `deposit` subcommand.
#[derive(Parser, Debug)]
pub struct DepositArgs {
    /// Depositor address.
    #[arg(long)]
    pub from: Address,

    /// Amount in ether, e.g. `10` or `0.5`.
    #[arg(long, value_parser = parse_amount)]
    pub amount: U256,
}

/// Arguments for the `withdraw` subcommand.
#[derive(Parser, Debug)]
pub struct WithdrawArgs {
    /// Hex-encoded secp256k1 private key of the withdrawing party.
    #[arg(long, env = "SAVINGS_KEY", hide_env_values = true)]
    pub key: String,

    /// Destination address. Defaults to the caller's own address.
    #[arg(long)]
    pub to: Option<Address>,
}

/// Arguments for the `set-permission` subcommand.
#[derive(Parser, Debug)]
pub struct SetPermissionArgs {
    /// Hex-encoded private key of the Initiator.
    #[arg(long, env = "SAVINGS_KEY", hide_env_values = true)]
    pub key: String,

    /// `true` to allow Cosigner self-withdrawals, `false` to block them.
    #[arg(long, action = ArgAction::Set)]
    pub enabled: bool,
}

/// Arguments for the `cosign` subcommand.
#[derive(Parser, Debug)]
pub struct CosignArgs {
    /// Hex-encoded private key of the Initiator.
    #[arg(long, env = "SAVINGS_KEY", hide_env_values = true)]
    pub key: String,

    /// Address that will receive the funds.
    #[arg(long)]
    pub recipient: Address,

    /// Amount in ether.
    #[arg(long, value_parser = parse_amount)]
    pub amount: U256,
}

/// Arguments for the `joint-withdraw` subcommand.
#[derive(Parser, Debug)]
pub struct JointWithdrawArgs {
    /// Hex-encoded private key of the Cosigner.
    #[arg(long, env = "SAVINGS_KEY", hide_env_values = true)]
    pub key: String,

    /// Address that will receive the funds.
    #[arg(long)]
    pub recipient: Address,

    /// Amount in ether.
    #[arg(long, value_parser = parse_amount)]
    pub amount: U256,

    /// The Initiator's 65-byte signature, hex-encoded.
    #[arg(long)]
    pub signature: String,
}

/// Parse a decimal ether amount into wei.
pub fn parse_amount(raw: &str) -> Result<U256, String> {
    parse_ether(raw.trim()).map_err(|e| format!("invalid ether amount {raw:?}: {e}"))
}
