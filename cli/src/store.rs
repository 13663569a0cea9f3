//! On-disk wallet for the CLI: a `WalletDB` plus the glue that turns its
//! snapshot back into a live `SavingsWallet`.

use std::path::Path;
use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};

use savings_contracts::{DomainContext, SavingsWallet, SystemClock, WalletEvent, WalletSnapshot};
use savings_protocol::crypto::keccak256_multi;
use savings_protocol::storage::WalletDB;
use savings_protocol::vault::{PayoutBook, PooledBalance};

/// Salt mixed into derived wallet addresses.
const CONTRACT_SALT: &[u8] = b"savings-wallet/v1";

pub struct WalletStore {
    db: WalletDB,
}

impl WalletStore {
    /// Open the store under `data_dir`, creating the directory if needed.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let db_path = data_dir.join("db");
        std::fs::create_dir_all(&db_path)
            .with_context(|| format!("failed to create data directory: {}", db_path.display()))?;
        let db = WalletDB::open(&db_path)
            .with_context(|| format!("failed to open database at {}", db_path.display()))?;
        Ok(Self { db })
    }

    /// Create and persist a fresh wallet. Fails if one already exists.
    pub fn create(&self, initiator: Address, cosigner: Address, domain: DomainContext) -> Result<SavingsWallet> {
        if self.db.is_initialized()? {
            bail!("a wallet already exists in this data directory");
        }
        let wallet = SavingsWallet::with_parts(
            initiator,
            cosigner,
            domain,
            PooledBalance::new(),
            PayoutBook::new(),
            Arc::new(SystemClock),
        )?;
        self.db.commit::<_, WalletEvent>(&wallet.snapshot(), None)?;
        Ok(wallet)
    }

    /// Load the persisted wallet.
    pub fn load(&self) -> Result<SavingsWallet> {
        let snapshot: WalletSnapshot = self
            .db
            .load_snapshot()?
            .context("no wallet in this data directory; run `savings-wallet init` first")?;
        let wallet = SavingsWallet::from_snapshot(&snapshot, PayoutBook::new(), Arc::new(SystemClock))?;
        Ok(wallet)
    }

    /// Persist the wallet's current state together with the event the
    /// last operation produced.
    pub fn commit(&self, wallet: &SavingsWallet, event: Option<&WalletEvent>) -> Result<()> {
        self.db
            .commit(&wallet.snapshot(), event)
            .context("failed to persist wallet state")
    }

    pub fn events(&self) -> Result<Vec<WalletEvent>> {
        Ok(self.db.events()?)
    }
}

/// Deterministic wallet address for a pair of parties on a chain.
pub fn derive_contract_address(initiator: Address, cosigner: Address, chain_id: u64) -> Address {
    let digest = keccak256_multi(&[
        CONTRACT_SALT,
        initiator.as_slice(),
        cosigner.as_slice(),
        &chain_id.to_be_bytes(),
    ]);
    Address::from_slice(&digest[12..])
}
