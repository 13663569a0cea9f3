//! Integration tests for the savings wallet.
//!
//! Covers the full policy surface: deposits, the 1% daily self-withdrawal
//! with its per-party latch, the Cosigner permission gate, co-signed joint
//! withdrawals, and the all-or-nothing guarantee on failure.

use std::sync::Arc;

use savings_contracts::authorization::Party;
use savings_contracts::clock::ManualClock;
use savings_contracts::cosign::DomainContext;
use savings_contracts::error::WalletError;
use savings_contracts::events::WalletEvent;
use savings_contracts::savings_wallet::SavingsWallet;
use savings_protocol::config::{BASE_UNITS_PER_COIN, SECONDS_PER_DAY};
use savings_protocol::crypto::WalletKeypair;
use savings_protocol::vault::{PayoutBook, PooledBalance};
use savings_protocol::{Address, U256};

/// Midnight UTC on some day well after the epoch.
const T0: u64 = 20_000 * SECONDS_PER_DAY;

struct Fixture {
    wallet: SavingsWallet<PooledBalance, Arc<PayoutBook>>,
    payouts: Arc<PayoutBook>,
    clock: Arc<ManualClock>,
    alice: WalletKeypair,
    bob: WalletKeypair,
}

fn ether(n: u64) -> U256 {
    U256::from(n) * U256::from(BASE_UNITS_PER_COIN)
}

fn milli_ether(n: u64) -> U256 {
    U256::from(n) * U256::from(BASE_UNITS_PER_COIN / 1_000)
}

fn fixture() -> Fixture {
    let alice = WalletKeypair::generate();
    let bob = WalletKeypair::generate();
    let payouts = Arc::new(PayoutBook::new());
    let clock = Arc::new(ManualClock::new(T0 + 3_600));
    let wallet = SavingsWallet::with_parts(
        alice.address(),
        bob.address(),
        DomainContext::new(Address::repeat_byte(0x5A), 31_337),
        PooledBalance::new(),
        payouts.clone(),
        clock.clone(),
    )
    .unwrap();
    Fixture {
        wallet,
        payouts,
        clock,
        alice,
        bob,
    }
}

fn funded(amount: U256) -> Fixture {
    let f = fixture();
    f.wallet.deposit(Address::repeat_byte(0xD0), amount).unwrap();
    f
}

fn cosign(f: &Fixture, signer: &WalletKeypair, recipient: Address, amount: U256) -> Vec<u8> {
    f.wallet
        .verifier()
        .sign(signer, recipient, amount)
        .unwrap()
        .as_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Deposits
// ---------------------------------------------------------------------------

#[test]
fn anyone_can_deposit() {
    let f = fixture();
    let stranger = Address::repeat_byte(0x99);

    let event = f.wallet.deposit(stranger, ether(1)).unwrap();
    assert_eq!(
        event,
        WalletEvent::Deposited {
            depositor: stranger,
            amount: ether(1)
        }
    );
    assert_eq!(f.wallet.balance(), ether(1));
}

#[test]
fn deposits_accumulate() {
    let f = fixture();
    f.wallet.deposit(f.alice.address(), ether(3)).unwrap();
    f.wallet.deposit(f.bob.address(), ether(2)).unwrap();
    assert_eq!(f.wallet.balance(), ether(5));
    assert_eq!(f.wallet.events().len(), 2);
}

#[test]
fn deposit_overflow_rejected_without_mutation() {
    let f = funded(U256::MAX);
    assert_eq!(
        f.wallet.deposit(f.alice.address(), U256::from(1u64)),
        Err(WalletError::AmountOverflow)
    );
    assert_eq!(f.wallet.balance(), U256::MAX);
    assert_eq!(f.wallet.events().len(), 1);
}

// ---------------------------------------------------------------------------
// Self-withdrawal
// ---------------------------------------------------------------------------

#[test]
fn self_withdrawal_pays_one_percent_of_current_balance() {
    let f = funded(ether(10));
    let alice_dest = Address::repeat_byte(0xA1);
    let bob_dest = Address::repeat_byte(0xB1);

    f.wallet.self_withdraw(f.alice.address(), alice_dest).unwrap();
    assert_eq!(f.payouts.received(&alice_dest), milli_ether(100));
    assert_eq!(f.wallet.balance(), milli_ether(9_900));

    // Bob's 1% is measured on the reduced pool.
    f.wallet.self_withdraw(f.bob.address(), bob_dest).unwrap();
    assert_eq!(f.payouts.received(&bob_dest), milli_ether(99));
    assert_eq!(f.wallet.balance(), milli_ether(9_801));
}

#[test]
fn self_withdrawal_emits_event_naming_caller() {
    let f = funded(ether(1));
    let dest = Address::repeat_byte(0x42);

    let event = f.wallet.self_withdraw(f.bob.address(), dest).unwrap();
    assert_eq!(
        event,
        WalletEvent::Withdrawn {
            initiator: f.bob.address(),
            destination: dest,
            amount: milli_ether(10),
        }
    );
    assert_eq!(f.wallet.events().last(), Some(&event));
}

#[test]
fn second_self_withdrawal_same_day_rejected() {
    let f = funded(ether(10));
    f.wallet
        .self_withdraw(f.alice.address(), f.alice.address())
        .unwrap();

    f.clock.advance(3_600);
    let err = f
        .wallet
        .self_withdraw(f.alice.address(), f.alice.address())
        .unwrap_err();
    assert_eq!(
        err,
        WalletError::AlreadyWithdrawnToday {
            party: Party::Initiator,
            day: T0 / SECONDS_PER_DAY,
        }
    );
    assert_eq!(f.wallet.balance(), milli_ether(9_900));
}

#[test]
fn latch_reopens_on_next_day_index() {
    let f = funded(ether(10));
    f.clock.set(T0 + SECONDS_PER_DAY - 1);
    f.wallet
        .self_withdraw(f.alice.address(), f.alice.address())
        .unwrap();

    // Two seconds later is a new calendar day.
    f.clock.set(T0 + SECONDS_PER_DAY + 1);
    assert!(f.wallet.can_self_withdraw(Party::Initiator));
    f.wallet
        .self_withdraw(f.alice.address(), f.alice.address())
        .unwrap();
    assert_eq!(
        f.wallet.last_withdrawal_day(Party::Initiator),
        Some(T0 / SECONDS_PER_DAY + 1)
    );
}

#[test]
fn one_partys_latch_does_not_affect_the_other() {
    let f = funded(ether(10));
    f.wallet
        .self_withdraw(f.alice.address(), f.alice.address())
        .unwrap();
    assert!(!f.wallet.can_self_withdraw(Party::Initiator));
    assert!(f.wallet.can_self_withdraw(Party::Cosigner));
    assert!(f.wallet.self_withdraw(f.bob.address(), f.bob.address()).is_ok());
}

#[test]
fn outsider_self_withdrawal_unauthorized() {
    let f = funded(ether(10));
    let outsider = Address::repeat_byte(0xEE);
    assert!(matches!(
        f.wallet.self_withdraw(outsider, outsider),
        Err(WalletError::Unauthorized { caller, .. }) if caller == outsider
    ));
    assert_eq!(f.wallet.balance(), ether(10));
    assert!(f.payouts.transfers().is_empty());
}

#[test]
fn tiny_balance_withdraws_zero_and_closes_latch() {
    let f = funded(U256::from(99u64));
    let event = f
        .wallet
        .self_withdraw(f.alice.address(), f.alice.address())
        .unwrap();
    assert_eq!(event.amount(), U256::ZERO);
    assert_eq!(f.wallet.balance(), U256::from(99u64));
    assert!(!f.wallet.can_self_withdraw(Party::Initiator));
}

// ---------------------------------------------------------------------------
// Permission toggle
// ---------------------------------------------------------------------------

#[test]
fn disabled_cosigner_gets_permission_denied() {
    let f = funded(ether(10));
    f.wallet
        .set_cosigner_permission(f.alice.address(), false)
        .unwrap();

    assert_eq!(
        f.wallet.self_withdraw(f.bob.address(), f.bob.address()),
        Err(WalletError::PermissionDenied)
    );
    assert_eq!(f.wallet.balance(), ether(10));
    assert_eq!(f.wallet.last_withdrawal_day(Party::Cosigner), None);

    // The gate never touches the Initiator.
    assert!(f
        .wallet
        .self_withdraw(f.alice.address(), f.alice.address())
        .is_ok());
}

#[test]
fn reenabled_cosigner_can_withdraw_again() {
    let f = funded(ether(10));
    f.wallet
        .set_cosigner_permission(f.alice.address(), false)
        .unwrap();
    f.wallet
        .set_cosigner_permission(f.alice.address(), true)
        .unwrap();
    assert!(f.wallet.self_withdraw(f.bob.address(), f.bob.address()).is_ok());
}

#[test]
fn only_initiator_sets_permission() {
    let f = fixture();
    let outsider = Address::repeat_byte(0xEE);

    for caller in [f.bob.address(), outsider] {
        assert!(matches!(
            f.wallet.set_cosigner_permission(caller, false),
            Err(WalletError::Unauthorized { .. })
        ));
    }
    assert!(f.wallet.cosigner_can_withdraw());
}

// ---------------------------------------------------------------------------
// Joint withdrawal
// ---------------------------------------------------------------------------

#[test]
fn joint_withdrawal_with_initiator_signature() {
    let f = funded(ether(10));
    let carol = Address::repeat_byte(0xCA);
    let sig = cosign(&f, &f.alice, carol, ether(4));

    let event = f
        .wallet
        .joint_withdraw(f.bob.address(), carol, ether(4), &sig)
        .unwrap();
    assert_eq!(
        event,
        WalletEvent::Withdrawn {
            initiator: f.bob.address(),
            destination: carol,
            amount: ether(4),
        }
    );
    assert_eq!(f.payouts.received(&carol), ether(4));
    assert_eq!(f.wallet.balance(), ether(6));
}

#[test]
fn joint_withdrawal_can_drain_the_pool() {
    let f = funded(ether(10));
    let carol = Address::repeat_byte(0xCA);
    let sig = cosign(&f, &f.alice, carol, ether(10));
    f.wallet
        .joint_withdraw(f.bob.address(), carol, ether(10), &sig)
        .unwrap();
    assert_eq!(f.wallet.balance(), U256::ZERO);
}

#[test]
fn joint_withdrawal_ignores_latches_and_permission() {
    let f = funded(ether(10));
    f.wallet
        .self_withdraw(f.alice.address(), f.alice.address())
        .unwrap();
    f.wallet
        .self_withdraw(f.bob.address(), f.bob.address())
        .unwrap();
    f.wallet
        .set_cosigner_permission(f.alice.address(), false)
        .unwrap();

    let carol = Address::repeat_byte(0xCA);
    let sig = cosign(&f, &f.alice, carol, ether(1));
    assert!(f
        .wallet
        .joint_withdraw(f.bob.address(), carol, ether(1), &sig)
        .is_ok());
}

#[test]
fn joint_withdrawal_leaves_latches_untouched() {
    let f = funded(ether(10));
    let carol = Address::repeat_byte(0xCA);
    let sig = cosign(&f, &f.alice, carol, ether(1));
    f.wallet
        .joint_withdraw(f.bob.address(), carol, ether(1), &sig)
        .unwrap();

    assert_eq!(f.wallet.last_withdrawal_day(Party::Cosigner), None);
    assert!(f.wallet.can_self_withdraw(Party::Cosigner));
}

#[test]
fn joint_withdrawal_only_by_cosigner() {
    let f = funded(ether(10));
    let carol = Address::repeat_byte(0xCA);
    let sig = cosign(&f, &f.alice, carol, ether(1));

    for caller in [f.alice.address(), Address::repeat_byte(0xEE)] {
        assert!(matches!(
            f.wallet.joint_withdraw(caller, carol, ether(1), &sig),
            Err(WalletError::Unauthorized { .. })
        ));
    }
    assert_eq!(f.wallet.balance(), ether(10));
}

#[test]
fn joint_withdrawal_over_balance_mutates_nothing() {
    let f = funded(ether(10));
    let carol = Address::repeat_byte(0xCA);
    let sig = cosign(&f, &f.alice, carol, ether(11));

    assert_eq!(
        f.wallet.joint_withdraw(f.bob.address(), carol, ether(11), &sig),
        Err(WalletError::InsufficientFunds {
            requested: ether(11),
            available: ether(10),
        })
    );
    assert_eq!(f.wallet.balance(), ether(10));
    assert_eq!(f.wallet.events().len(), 1);
    assert!(f.payouts.transfers().is_empty());
}

#[test]
fn joint_withdrawal_signed_by_cosigner_rejected() {
    let f = funded(ether(10));
    let carol = Address::repeat_byte(0xCA);
    let sig = cosign(&f, &f.bob, carol, ether(1));
    assert_eq!(
        f.wallet.joint_withdraw(f.bob.address(), carol, ether(1), &sig),
        Err(WalletError::InvalidSignature)
    );
    assert_eq!(f.wallet.balance(), ether(10));
}

#[test]
fn joint_withdrawal_with_garbage_signature_rejected() {
    let f = funded(ether(10));
    let carol = Address::repeat_byte(0xCA);
    for sig in [vec![], vec![0u8; 64], vec![0xFFu8; 65]] {
        assert_eq!(
            f.wallet.joint_withdraw(f.bob.address(), carol, ether(1), &sig),
            Err(WalletError::InvalidSignature)
        );
    }
}

#[test]
fn joint_withdrawal_signature_is_not_single_use() {
    // Nonce-free: the same signature authorizes the same withdrawal again.
    let f = funded(ether(10));
    let carol = Address::repeat_byte(0xCA);
    let sig = cosign(&f, &f.alice, carol, ether(2));

    f.wallet
        .joint_withdraw(f.bob.address(), carol, ether(2), &sig)
        .unwrap();
    f.wallet
        .joint_withdraw(f.bob.address(), carol, ether(2), &sig)
        .unwrap();
    assert_eq!(f.wallet.balance(), ether(6));
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[test]
fn two_day_scenario() {
    let f = fixture();
    let alice_dest = Address::repeat_byte(0xA1);
    let bob_dest = Address::repeat_byte(0xB1);
    let carol = Address::repeat_byte(0xCA);

    // Day 0: fund, both parties take their 1%.
    f.wallet.deposit(f.alice.address(), ether(10)).unwrap();
    f.wallet.self_withdraw(f.alice.address(), alice_dest).unwrap();
    f.wallet.self_withdraw(f.bob.address(), bob_dest).unwrap();
    assert_eq!(f.wallet.balance(), milli_ether(9_801));
    assert!(matches!(
        f.wallet.self_withdraw(f.alice.address(), alice_dest),
        Err(WalletError::AlreadyWithdrawnToday { .. })
    ));
    assert!(matches!(
        f.wallet.self_withdraw(f.bob.address(), bob_dest),
        Err(WalletError::AlreadyWithdrawnToday { .. })
    ));

    // Alice switches Bob off; Bob moves 1 ether to Carol with her signature.
    f.wallet
        .set_cosigner_permission(f.alice.address(), false)
        .unwrap();
    let sig = cosign(&f, &f.alice, carol, ether(1));
    f.wallet
        .joint_withdraw(f.bob.address(), carol, ether(1), &sig)
        .unwrap();
    assert_eq!(f.wallet.balance(), milli_ether(8_801));

    // Day 1: Alice withdraws again, Bob is still gated.
    f.clock.advance(SECONDS_PER_DAY);
    f.wallet.self_withdraw(f.alice.address(), alice_dest).unwrap();
    assert_eq!(
        f.wallet.self_withdraw(f.bob.address(), bob_dest),
        Err(WalletError::PermissionDenied)
    );

    let expected_alice = milli_ether(100) + U256::from(88_010_000_000_000_000u128);
    assert_eq!(f.payouts.received(&alice_dest), expected_alice);
    assert_eq!(f.payouts.received(&bob_dest), milli_ether(99));
    assert_eq!(f.payouts.received(&carol), ether(1));
    assert_eq!(
        f.wallet.balance(),
        milli_ether(8_801) - U256::from(88_010_000_000_000_000u128)
    );

    let kinds: Vec<bool> = f
        .wallet
        .events()
        .iter()
        .map(|e| matches!(e, WalletEvent::Deposited { .. }))
        .collect();
    assert_eq!(kinds, vec![true, false, false, false, false]);
}
