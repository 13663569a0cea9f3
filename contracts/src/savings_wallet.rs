//! # Savings Wallet
//!
//! Shared funds between two fixed parties. The three ways money moves:
//!
//! 1. **Deposit** — anyone credits the pool.
//! 2. **Self-withdrawal** — either party takes 1% of the current pool, at
//!    most once per day each. The Initiator can switch this off for the
//!    Cosigner.
//! 3. **Joint withdrawal** — the Cosigner takes any amount up to the full
//!    pool, carrying a signature from the Initiator over
//!    `(recipient, amount, wallet, chain)`. Daily latches are not consulted.
//!
//! ## Serialization and re-entry
//!
//! All mutable state sits behind one `ReentrantMutex`, held for the whole
//! call, so check-then-debit-then-record never interleaves with another
//! call. Withdrawals apply their bookkeeping before the payout runs. The
//! payout is an external call and may call back into the wallet on the
//! same thread; read-only accessors work from there, state-changing calls
//! fail with [`WalletError::Reentrancy`]. A payout that fails or panics
//! rolls back the debit and the latch.

use std::cell::{Cell, RefCell};
use std::sync::Arc;

use alloy_primitives::{Address, U256};
use parking_lot::ReentrantMutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use savings_protocol::vault::{Ledger, Payout, PayoutBook, PooledBalance};

use crate::authorization::{day_index, self_withdrawal_amount, AuthorizationState, Party};
use crate::clock::{Clock, SystemClock};
use crate::cosign::{DomainContext, JointWithdrawalRequest, SignatureVerifier};
use crate::error::WalletError;
use crate::events::WalletEvent;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct WalletState<L> {
    auth: AuthorizationState,
    ledger: L,
    events: Vec<WalletEvent>,
}

struct Shared<L> {
    state: RefCell<WalletState<L>>,
    entered: Cell<bool>,
}

/// Marks the wallet as busy for the duration of a state-changing call.
struct EntryGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> EntryGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Result<Self, WalletError> {
        if flag.get() {
            return Err(WalletError::Reentrancy);
        }
        flag.set(true);
        Ok(Self { flag })
    }
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Undoes a withdrawal's bookkeeping when dropped while still armed, so
/// the rollback also runs when the payout unwinds.
struct Rollback<'a, L: Ledger> {
    state: &'a RefCell<WalletState<L>>,
    amount: U256,
    latch: Option<(Party, Option<u64>)>,
    armed: bool,
}

impl<'a, L: Ledger> Rollback<'a, L> {
    fn arm(
        state: &'a RefCell<WalletState<L>>,
        amount: U256,
        latch: Option<(Party, Option<u64>)>,
    ) -> Self {
        Self {
            state,
            amount,
            latch,
            armed: true,
        }
    }

    /// The payout went through; keep the bookkeeping.
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<L: Ledger> Drop for Rollback<'_, L> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(mut state) = self.state.try_borrow_mut() else {
            warn!(amount = %self.amount, "wallet state busy during rollback");
            return;
        };
        if let Some((party, previous)) = self.latch {
            state.auth.restore_withdrawal(party, previous);
        }
        if let Err(err) = state.ledger.credit(self.amount) {
            warn!(amount = %self.amount, error = %err, "rollback credit failed");
        }
    }
}

/// Persisted form of a wallet: everything needed to rebuild it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    pub initiator: Address,
    pub cosigner: Address,
    pub domain: DomainContext,
    pub initiator_last_day: Option<u64>,
    pub cosigner_last_day: Option<u64>,
    pub cosigner_can_withdraw: bool,
    pub balance: U256,
}

// ---------------------------------------------------------------------------
// SavingsWallet
// ---------------------------------------------------------------------------

/// A two-party savings wallet.
pub struct SavingsWallet<L: Ledger = PooledBalance, P: Payout = PayoutBook> {
    initiator: Address,
    cosigner: Address,
    verifier: SignatureVerifier,
    shared: ReentrantMutex<Shared<L>>,
    payout: P,
    clock: Arc<dyn Clock>,
}

impl SavingsWallet<PooledBalance, PayoutBook> {
    /// An empty wallet on the system clock with in-memory bookkeeping.
    pub fn create(
        initiator: Address,
        cosigner: Address,
        domain: DomainContext,
    ) -> Result<Self, WalletError> {
        Self::with_parts(
            initiator,
            cosigner,
            domain,
            PooledBalance::new(),
            PayoutBook::new(),
            Arc::new(SystemClock),
        )
    }
}

impl<P: Payout> SavingsWallet<PooledBalance, P> {
    /// Rebuild a wallet from a persisted snapshot.
    pub fn from_snapshot(
        snapshot: &WalletSnapshot,
        payout: P,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WalletError> {
        let wallet = Self::with_parts(
            snapshot.initiator,
            snapshot.cosigner,
            snapshot.domain,
            PooledBalance::with_balance(snapshot.balance),
            payout,
            clock,
        )?;
        {
            let guard = wallet.shared.lock();
            guard.state.borrow_mut().auth = AuthorizationState::from_parts(
                snapshot.initiator_last_day,
                snapshot.cosigner_last_day,
                snapshot.cosigner_can_withdraw,
            );
        }
        Ok(wallet)
    }
}

impl<L: Ledger, P: Payout> SavingsWallet<L, P> {
    /// Assemble a wallet from its collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::InvalidParties`] if the two addresses are
    /// equal or either is zero.
    pub fn with_parts(
        initiator: Address,
        cosigner: Address,
        domain: DomainContext,
        ledger: L,
        payout: P,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WalletError> {
        if initiator == cosigner || initiator.is_zero() || cosigner.is_zero() {
            return Err(WalletError::InvalidParties {
                initiator,
                cosigner,
            });
        }

        info!(
            %initiator,
            %cosigner,
            contract = %domain.contract,
            chain_id = domain.chain_id,
            "savings wallet created"
        );

        Ok(Self {
            initiator,
            cosigner,
            verifier: SignatureVerifier::new(domain),
            shared: ReentrantMutex::new(Shared {
                state: RefCell::new(WalletState {
                    auth: AuthorizationState::new(),
                    ledger,
                    events: Vec::new(),
                }),
                entered: Cell::new(false),
            }),
            payout,
            clock,
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn initiator(&self) -> Address {
        self.initiator
    }

    pub fn cosigner(&self) -> Address {
        self.cosigner
    }

    pub fn domain(&self) -> &DomainContext {
        self.verifier.domain()
    }

    pub fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    pub fn payout(&self) -> &P {
        &self.payout
    }

    /// Which party `address` is, if any.
    pub fn party_of(&self, address: Address) -> Option<Party> {
        if address == self.initiator {
            Some(Party::Initiator)
        } else if address == self.cosigner {
            Some(Party::Cosigner)
        } else {
            None
        }
    }

    pub fn balance(&self) -> U256 {
        let guard = self.shared.lock();
        let balance = guard.state.borrow().ledger.balance();
        balance
    }

    pub fn cosigner_can_withdraw(&self) -> bool {
        let guard = self.shared.lock();
        let enabled = guard.state.borrow().auth.cosigner_can_withdraw();
        enabled
    }

    pub fn last_withdrawal_day(&self, party: Party) -> Option<u64> {
        let guard = self.shared.lock();
        let day = guard.state.borrow().auth.last_withdrawal_day(party);
        day
    }

    /// Whether `party` could self-withdraw right now.
    pub fn can_self_withdraw(&self, party: Party) -> bool {
        let day = day_index(self.clock.now_unix());
        let guard = self.shared.lock();
        let allowed = guard.state.borrow().auth.can_self_withdraw(party, day);
        allowed
    }

    /// Every event emitted so far, oldest first.
    pub fn events(&self) -> Vec<WalletEvent> {
        let guard = self.shared.lock();
        let events = guard.state.borrow().events.clone();
        events
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        let guard = self.shared.lock();
        let state = guard.state.borrow();
        WalletSnapshot {
            initiator: self.initiator,
            cosigner: self.cosigner,
            domain: *self.verifier.domain(),
            initiator_last_day: state.auth.last_withdrawal_day(Party::Initiator),
            cosigner_last_day: state.auth.last_withdrawal_day(Party::Cosigner),
            cosigner_can_withdraw: state.auth.cosigner_can_withdraw(),
            balance: state.ledger.balance(),
        }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Credit the pool. Anyone may deposit.
    ///
    /// # Errors
    ///
    /// [`WalletError::ZeroDeposit`] for a zero amount,
    /// [`WalletError::AmountOverflow`] if the pool would overflow.
    pub fn deposit(&self, depositor: Address, amount: U256) -> Result<WalletEvent, WalletError> {
        if amount.is_zero() {
            return Err(WalletError::ZeroDeposit);
        }

        let guard = self.shared.lock();
        let _entry = EntryGuard::enter(&guard.entered)?;
        let mut state = guard.state.borrow_mut();

        let balance = state.ledger.credit(amount)?;
        let event = WalletEvent::Deposited { depositor, amount };
        state.events.push(event.clone());

        info!(%depositor, %amount, %balance, "deposit");
        Ok(event)
    }

    /// Take 1% of the current pool and send it to `destination`.
    ///
    /// # Errors
    ///
    /// [`WalletError::Unauthorized`] if `caller` is neither party,
    /// [`WalletError::PermissionDenied`] for a gated Cosigner,
    /// [`WalletError::AlreadyWithdrawnToday`] if the caller's latch is
    /// closed, [`WalletError::PayoutFailed`] if the transfer fails.
    pub fn self_withdraw(
        &self,
        caller: Address,
        destination: Address,
    ) -> Result<WalletEvent, WalletError> {
        let party = self.party_of(caller).ok_or(WalletError::Unauthorized {
            caller,
            action: "self-withdraw",
        })?;
        let day = day_index(self.clock.now_unix());

        let guard = self.shared.lock();
        let _entry = EntryGuard::enter(&guard.entered)?;

        let (amount, previous_day) = {
            let mut state = guard.state.borrow_mut();
            if let Err(err) = state.auth.check_self_withdraw(party, day) {
                warn!(%caller, %party, day, error = %err, "self-withdrawal rejected");
                return Err(err);
            }
            // Measured now, right before the debit.
            let amount = self_withdrawal_amount(state.ledger.balance())?;
            state.ledger.debit(amount)?;
            let previous_day = state.auth.record_withdrawal(party, day);
            (amount, previous_day)
        };

        let rollback = Rollback::arm(&guard.state, amount, Some((party, previous_day)));
        if let Err(err) = self.payout.send(destination, amount) {
            drop(rollback);
            warn!(%caller, %destination, %amount, error = %err, "payout failed, withdrawal rolled back");
            return Err(WalletError::PayoutFailed(err));
        }
        rollback.disarm();

        let event = WalletEvent::Withdrawn {
            initiator: caller,
            destination,
            amount,
        };
        guard.state.borrow_mut().events.push(event.clone());

        info!(%caller, %party, %destination, %amount, day, "self-withdrawal");
        Ok(event)
    }

    /// Withdraw `amount` to `recipient` on the strength of the Initiator's
    /// co-signature. Only the Cosigner may call this.
    ///
    /// # Errors
    ///
    /// [`WalletError::Unauthorized`] if `caller` is not the Cosigner,
    /// [`WalletError::InsufficientFunds`] if `amount` exceeds the pool,
    /// [`WalletError::InvalidSignature`] if the signature does not recover
    /// to the Initiator, [`WalletError::PayoutFailed`] if the transfer fails.
    pub fn joint_withdraw(
        &self,
        caller: Address,
        recipient: Address,
        amount: U256,
        signature: &[u8],
    ) -> Result<WalletEvent, WalletError> {
        if caller != self.cosigner {
            return Err(WalletError::Unauthorized {
                caller,
                action: "joint-withdraw",
            });
        }

        let guard = self.shared.lock();
        let _entry = EntryGuard::enter(&guard.entered)?;

        {
            let mut state = guard.state.borrow_mut();
            let available = state.ledger.balance();
            if amount > available {
                return Err(WalletError::InsufficientFunds {
                    requested: amount,
                    available,
                });
            }

            let request = JointWithdrawalRequest {
                recipient,
                amount,
                signature: signature.to_vec(),
            };
            if !self.verifier.verify(&request, self.initiator) {
                warn!(%caller, %recipient, %amount, "joint withdrawal signature rejected");
                return Err(WalletError::InvalidSignature);
            }

            state.ledger.debit(amount)?;
        }

        let rollback = Rollback::arm(&guard.state, amount, None);
        if let Err(err) = self.payout.send(recipient, amount) {
            drop(rollback);
            warn!(%caller, %recipient, %amount, error = %err, "payout failed, withdrawal rolled back");
            return Err(WalletError::PayoutFailed(err));
        }
        rollback.disarm();

        let event = WalletEvent::Withdrawn {
            initiator: caller,
            destination: recipient,
            amount,
        };
        guard.state.borrow_mut().events.push(event.clone());

        info!(%caller, %recipient, %amount, "joint withdrawal");
        Ok(event)
    }

    /// Switch the Cosigner's self-withdrawals on or off. Initiator only.
    pub fn set_cosigner_permission(&self, caller: Address, enabled: bool) -> Result<(), WalletError> {
        let unauthorized = WalletError::Unauthorized {
            caller,
            action: "set cosigner permission",
        };
        let party = self.party_of(caller).ok_or_else(|| unauthorized.clone())?;

        let guard = self.shared.lock();
        let _entry = EntryGuard::enter(&guard.entered)?;
        let mut state = guard.state.borrow_mut();

        state
            .auth
            .set_cosigner_permission(party, enabled)
            .map_err(|_| unauthorized)?;

        info!(%caller, enabled, "cosigner permission updated");
        Ok(())
    }
}

impl<L: Ledger, P: Payout> std::fmt::Debug for SavingsWallet<L, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SavingsWallet")
            .field("initiator", &self.initiator)
            .field("cosigner", &self.cosigner)
            .field("domain", self.verifier.domain())
            .field("balance", &self.balance())
            .finish_non_exhaustive()
    }
}
