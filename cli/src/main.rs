// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Savings Wallet CLI
//!
//! Entry point for the `savings-wallet` binary. Parses CLI arguments,
//! initializes logging, and runs one wallet operation against the wallet
//! stored in the data directory.
//!
//! Every state-changing command loads the persisted snapshot, runs the
//! operation, and commits the new snapshot together with the resulting
//! event in one transaction. A failed operation commits nothing.

mod cli;
mod logging;
mod store;

use alloy_primitives::utils::format_ether;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;

use savings_contracts::authorization::day_index;
use savings_contracts::{Clock, DomainContext, Party, SavingsWallet, SystemClock, WalletEvent};
use savings_protocol::config::{network_name, SECONDS_PER_DAY};
use savings_protocol::crypto::WalletKeypair;

use cli::{Commands, SavingsCli};
use logging::LogFormat;
use store::{derive_contract_address, WalletStore};

fn main() -> Result<()> {
    let cli = SavingsCli::parse();
    logging::init_logging(
        logging::DEFAULT_FILTER,
        LogFormat::from_str_lossy(&cli.log_format),
    );

    run(cli)
}

fn run(cli: SavingsCli) -> Result<()> {
    // keygen is the only command that never touches the data directory.
    let open = || WalletStore::open(&cli.data_dir);
    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Init(args) => init_wallet(&open()?, args),
        Commands::Deposit(args) => deposit(&open()?, args),
        Commands::Withdraw(args) => self_withdraw(&open()?, args),
        Commands::SetPermission(args) => set_permission(&open()?, args),
        Commands::Cosign(args) => cosign(&open()?, args),
        Commands::JointWithdraw(args) => joint_withdraw(&open()?, args),
        Commands::Status => status(&open()?),
        Commands::Events => events(&open()?),
    }
}

fn keygen() -> Result<()> {
    let keypair = WalletKeypair::generate();
    println!("address:     {}", keypair.address());
    println!("private key: {}", keypair.to_hex());
    Ok(())
}

fn init_wallet(store: &WalletStore, args: cli::InitArgs) -> Result<()> {
    let contract = args
        .contract
        .unwrap_or_else(|| derive_contract_address(args.initiator, args.cosigner, args.chain_id));
    let domain = DomainContext::new(contract, args.chain_id);

    let wallet = store.create(args.initiator, args.cosigner, domain)?;
    tracing::info!(
        contract = %contract,
        network = %network_name(args.chain_id),
        "wallet initialized"
    );

    println!("wallet:    {}", contract);
    println!("network:   {}", network_name(args.chain_id));
    println!("initiator: {}", wallet.initiator());
    println!("cosigner:  {}", wallet.cosigner());
    Ok(())
}

fn deposit(store: &WalletStore, args: cli::DepositArgs) -> Result<()> {
    let wallet = store.load()?;
    let event = wallet.deposit(args.from, args.amount)?;
    commit_and_print(store, &wallet, &event)
}

fn self_withdraw(store: &WalletStore, args: cli::WithdrawArgs) -> Result<()> {
    let keypair = load_key(&args.key)?;
    let caller = keypair.address();
    let destination = args.to.unwrap_or(caller);

    let wallet = store.load()?;
    let event = wallet.self_withdraw(caller, destination)?;
    commit_and_print(store, &wallet, &event)
}

fn set_permission(store: &WalletStore, args: cli::SetPermissionArgs) -> Result<()> {
    let keypair = load_key(&args.key)?;
    let wallet = store.load()?;
    wallet.set_cosigner_permission(keypair.address(), args.enabled)?;
    store.commit(&wallet, None)?;
    println!(
        "cosigner self-withdrawals {}",
        if args.enabled { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn cosign(store: &WalletStore, args: cli::CosignArgs) -> Result<()> {
    let keypair = load_key(&args.key)?;
    let wallet = store.load()?;
    if keypair.address() != wallet.initiator() {
        tracing::warn!(
            signer = %keypair.address(),
            initiator = %wallet.initiator(),
            "signing key is not the initiator; the wallet will reject this signature"
        );
    }

    let signature = wallet
        .verifier()
        .sign(&keypair, args.recipient, args.amount)
        .context("failed to sign joint withdrawal")?;
    println!("{}", signature.to_hex());
    Ok(())
}

fn joint_withdraw(store: &WalletStore, args: cli::JointWithdrawArgs) -> Result<()> {
    let keypair = load_key(&args.key)?;
    let raw = args.signature.trim();
    let signature = hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
        .context("signature is not valid hex")?;

    let wallet = store.load()?;
    let event = wallet.joint_withdraw(keypair.address(), args.recipient, args.amount, &signature)?;
    commit_and_print(store, &wallet, &event)
}

fn status(store: &WalletStore) -> Result<()> {
    let wallet = store.load()?;
    let domain = wallet.domain();
    let now = SystemClock.now_unix();
    let today = day_index(now);

    println!("wallet:       {}", domain.contract);
    println!("network:      {} (chain id {})", network_name(domain.chain_id), domain.chain_id);
    println!("balance:      {} ETH", format_ether(wallet.balance()));
    println!("initiator:    {}", wallet.initiator());
    println!("cosigner:     {}", wallet.cosigner());
    println!(
        "cosigner self-withdrawals: {}",
        if wallet.cosigner_can_withdraw() { "enabled" } else { "disabled" }
    );
    println!("today:        day {} ({})", today, day_label(today));
    for party in [Party::Initiator, Party::Cosigner] {
        let last = wallet
            .last_withdrawal_day(party)
            .map(|d| format!("day {} ({})", d, day_label(d)))
            .unwrap_or_else(|| "never".to_string());
        let available = if wallet.can_self_withdraw(party) { "available" } else { "unavailable" };
        println!("{:<13} last self-withdrawal {}, today {}", format!("{party}:"), last, available);
    }
    Ok(())
}

fn events(store: &WalletStore) -> Result<()> {
    for event in store.events()? {
        println!("{}", serde_json::to_string(&event)?);
    }
    Ok(())
}

fn load_key(hex_key: &str) -> Result<WalletKeypair> {
    WalletKeypair::from_hex(hex_key).context("invalid private key")
}

fn commit_and_print(store: &WalletStore, wallet: &SavingsWallet, event: &WalletEvent) -> Result<()> {
    store.commit(wallet, Some(event))?;
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

fn day_label(day: u64) -> String {
    i64::try_from(day.saturating_mul(SECONDS_PER_DAY))
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "out of range".to_string())
}
