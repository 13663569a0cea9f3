//! # Withdrawal Authorization
//!
//! Per-party daily latches and the Cosigner permission gate.
//!
//! Each party has one latch per day index: open at the start of the day,
//! closed by that party's first successful self-withdrawal, reopened when
//! the day index advances. The permission flag is a second, independent
//! gate that applies to the Cosigner only. Joint withdrawals never consult
//! any of this.
//!
//! Day indices are `timestamp / SECONDS_PER_DAY`: a calendar-day policy on
//! Unix time, not a rolling 24-hour window.

use serde::{Deserialize, Serialize};

use savings_protocol::config::{BPS_DENOMINATOR, SECONDS_PER_DAY, SELF_WITHDRAWAL_BPS};
use savings_protocol::U256;

use crate::error::WalletError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One of the two fixed wallet members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    /// Holds the permission toggle and co-signs joint withdrawals (Alice).
    Initiator,
    /// Gated by the permission toggle; submits joint withdrawals (Bob).
    Cosigner,
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Party::Initiator => write!(f, "Initiator"),
            Party::Cosigner => write!(f, "Cosigner"),
        }
    }
}

/// Last self-withdrawal day for one party. `None` means never.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub last_withdrawal_day: Option<u64>,
}

impl WithdrawalRecord {
    fn withdrew_on(&self, day: u64) -> bool {
        self.last_withdrawal_day == Some(day)
    }
}

/// Day index for a Unix timestamp.
pub fn day_index(timestamp: u64) -> u64 {
    timestamp / SECONDS_PER_DAY
}

/// The fixed self-withdrawal amount for a given pooled balance: 1%,
/// rounded down.
pub fn self_withdrawal_amount(balance: U256) -> Result<U256, WalletError> {
    let scaled = balance
        .checked_mul(U256::from(SELF_WITHDRAWAL_BPS))
        .ok_or(WalletError::AmountOverflow)?;
    Ok(scaled / U256::from(BPS_DENOMINATOR))
}

// ---------------------------------------------------------------------------
// AuthorizationState
// ---------------------------------------------------------------------------

/// Daily latches for both parties plus the Cosigner permission flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationState {
    initiator: WithdrawalRecord,
    cosigner: WithdrawalRecord,
    cosigner_can_withdraw: bool,
}

impl Default for AuthorizationState {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthorizationState {
    /// Both latches open, Cosigner permitted.
    pub fn new() -> Self {
        Self {
            initiator: WithdrawalRecord::default(),
            cosigner: WithdrawalRecord::default(),
            cosigner_can_withdraw: true,
        }
    }

    /// Rebuild from persisted fields.
    pub fn from_parts(
        initiator_last_day: Option<u64>,
        cosigner_last_day: Option<u64>,
        cosigner_can_withdraw: bool,
    ) -> Self {
        Self {
            initiator: WithdrawalRecord {
                last_withdrawal_day: initiator_last_day,
            },
            cosigner: WithdrawalRecord {
                last_withdrawal_day: cosigner_last_day,
            },
            cosigner_can_withdraw,
        }
    }

    fn record(&self, party: Party) -> &WithdrawalRecord {
        match party {
            Party::Initiator => &self.initiator,
            Party::Cosigner => &self.cosigner,
        }
    }

    fn record_mut(&mut self, party: Party) -> &mut WithdrawalRecord {
        match party {
            Party::Initiator => &mut self.initiator,
            Party::Cosigner => &mut self.cosigner,
        }
    }

    pub fn cosigner_can_withdraw(&self) -> bool {
        self.cosigner_can_withdraw
    }

    pub fn last_withdrawal_day(&self, party: Party) -> Option<u64> {
        self.record(party).last_withdrawal_day
    }

    /// Whether `party` may self-withdraw on `day`.
    pub fn can_self_withdraw(&self, party: Party, day: u64) -> bool {
        self.check_self_withdraw(party, day).is_ok()
    }

    /// Like [`can_self_withdraw`](Self::can_self_withdraw), but says why not.
    ///
    /// A gated Cosigner gets `PermissionDenied` even if their latch is
    /// open; a closed latch otherwise gives `AlreadyWithdrawnToday`.
    pub fn check_self_withdraw(&self, party: Party, day: u64) -> Result<(), WalletError> {
        if party == Party::Cosigner && !self.cosigner_can_withdraw {
            return Err(WalletError::PermissionDenied);
        }
        if self.record(party).withdrew_on(day) {
            return Err(WalletError::AlreadyWithdrawnToday { party, day });
        }
        Ok(())
    }

    /// Close `party`'s latch for `day`. Returns the previous record so the
    /// caller can undo it if the surrounding withdrawal fails.
    ///
    /// Call only after the matching debit has succeeded.
    pub fn record_withdrawal(&mut self, party: Party, day: u64) -> Option<u64> {
        self.record_mut(party)
            .last_withdrawal_day
            .replace(day)
    }

    /// Put back a record returned by [`record_withdrawal`](Self::record_withdrawal).
    pub fn restore_withdrawal(&mut self, party: Party, previous: Option<u64>) {
        self.record_mut(party).last_withdrawal_day = previous;
    }

    /// Overwrite the Cosigner permission flag. Only the Initiator may do
    /// this; setting the current value again is not an error.
    pub fn set_cosigner_permission(
        &mut self,
        caller: Party,
        enabled: bool,
    ) -> Result<(), PermissionRejected> {
        if caller != Party::Initiator {
            return Err(PermissionRejected);
        }
        self.cosigner_can_withdraw = enabled;
        Ok(())
    }
}

/// Marker returned when a non-Initiator tries to change the permission
/// flag. The wallet turns it into [`WalletError::Unauthorized`] with the
/// caller's address attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRejected;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
