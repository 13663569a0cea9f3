//! # WalletDB — Persistent Storage Engine
//!
//! Embedded persistence for a single wallet instance, built on sled.
//!
//! ## Tree Layout
//!
//! | Tree     | Key                  | Value                 |
//! |----------|----------------------|-----------------------|
//! | `state`  | `wallet` (UTF-8)     | `json(WalletSnapshot)`|
//! | `events` | sequence (8B BE)     | `json(WalletEvent)`   |
//!
//! Event sequence numbers are big-endian so that sled's lexicographic
//! ordering matches insertion order.
//!
//! Values are JSON rather than bincode: `U256` and `Address` serialize as
//! hex strings, and JSON keeps the store inspectable with ordinary tools.
//!
//! ## Atomicity
//!
//! [`WalletDB::commit`] writes the new snapshot and the event it produced
//! in one sled transaction across both trees. Either both land or neither
//! does.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::transaction::{ConflictableTransactionError, TransactionError, Transactional};
use sled::{Db, Tree};
use tracing::debug;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("transaction aborted: {0}")]
    Transaction(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Key of the single snapshot record in the `state` tree.
const SNAPSHOT_KEY: &[u8] = b"wallet";

// ---------------------------------------------------------------------------
// WalletDB
// ---------------------------------------------------------------------------

/// Persistent storage for one wallet: its latest snapshot and its
/// append-only event log.
///
/// The record types are generic so the storage layer does not depend on
/// the policy crate that defines them.
#[derive(Debug, Clone)]
pub struct WalletDB {
    db: Db,
    state: Tree,
    events: Tree,
}

impl WalletDB {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let state = db.open_tree("state")?;
        let events = db.open_tree("events")?;
        Ok(Self { db, state, events })
    }

    /// Returns `true` if a snapshot has been written.
    pub fn is_initialized(&self) -> DbResult<bool> {
        Ok(self.state.contains_key(SNAPSHOT_KEY)?)
    }

    /// Load the latest snapshot, if any.
    pub fn load_snapshot<T: DeserializeOwned>(&self) -> DbResult<Option<T>> {
        match self.state.get(SNAPSHOT_KEY)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .map_err(|e| DbError::Serialization(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Atomically replace the snapshot and, if given, append one event.
    pub fn commit<S: Serialize, E: Serialize>(
        &self,
        snapshot: &S,
        event: Option<&E>,
    ) -> DbResult<()> {
        let snapshot_bytes =
            serde_json::to_vec(snapshot).map_err(|e| DbError::Serialization(e.to_string()))?;
        let event_bytes = event
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| DbError::Serialization(e.to_string()))?;
        let next_seq = self.next_event_seq()?;

        let result: Result<(), TransactionError<()>> =
            (&self.state, &self.events).transaction(|(state, events)| {
                state.insert(SNAPSHOT_KEY, snapshot_bytes.as_slice())?;
                if let Some(bytes) = &event_bytes {
                    events.insert(&next_seq.to_be_bytes()[..], bytes.as_slice())?;
                }
                Ok::<(), ConflictableTransactionError<()>>(())
            });
        result.map_err(|e| DbError::Transaction(format!("{:?}", e)))?;

        let flushed = self.db.flush()?;
        debug!(
            event_seq = event_bytes.as_ref().map(|_| next_seq),
            flushed, "wallet state committed"
        );
        Ok(())
    }

    /// All events in insertion order.
    pub fn events<T: DeserializeOwned>(&self) -> DbResult<Vec<T>> {
        let mut out = Vec::new();
        for entry in self.events.iter() {
            let (_, value) = entry?;
            let event =
                serde_json::from_slice(&value).map_err(|e| DbError::Serialization(e.to_string()))?;
            out.push(event);
        }
        Ok(out)
    }

    /// Number of stored events.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    fn next_event_seq(&self) -> DbResult<u64> {
        match self.events.last()? {
            Some((key, _)) => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(&key);
                Ok(u64::from_be_bytes(buf) + 1)
            }
            None => Ok(0),
        }
    }
}
