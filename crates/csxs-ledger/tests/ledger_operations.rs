//! Ledger operation tests
//!
//! Covers construction, ownership transfer, rate changes and purchases as
//! seen from outside the crate.

use assert_matches::assert_matches;
use csxs_ledger::{
    wei_to_whole_units, Address, ErrorKind, LedgerError, LedgerEvent, TokenLedger, WEI_PER_ETHER,
};

const SUPPLY: u64 = 9_999_000_000;

fn king() -> Address {
    Address::new([0x11; 20])
}

fn queen() -> Address {
    Address::new([0x22; 20])
}

fn jack() -> Address {
    Address::new([0x33; 20])
}

fn snapshot(ledger: &TokenLedger) -> Vec<(Address, u64)> {
    ledger.holders()
}

#[test]
fn initializes_with_full_pool() {
    let ledger = TokenLedger::new(king()).unwrap();

    assert_eq!(ledger.owner(), king());
    assert_eq!(ledger.total_supply(), SUPPLY);
    assert_eq!(ledger.rate(), 270);
    assert_eq!(ledger.balance_of(&ledger.pool_address()), SUPPLY);
    assert_eq!(ledger.metadata().symbol, "CSXS");
    assert!(ledger.verify_supply().is_ok());
}

#[test]
fn transfers_ownership() {
    let ledger = TokenLedger::new(king()).unwrap();

    let event = ledger.transfer_ownership(Some(queen()), king()).unwrap();
    assert_eq!(event.name(), "OwnerTransferred");
    assert_eq!(
        event,
        LedgerEvent::OwnerTransferred {
            previous_owner: king(),
            new_owner: queen(),
        }
    );
    assert_eq!(ledger.owner(), queen());

    // the old owner has lost its privileges
    assert_matches!(
        ledger.change_rate(10, king()),
        Err(LedgerError::Unauthorized { .. })
    );
    assert!(ledger.change_rate(10, queen()).is_ok());
}

#[test]
fn non_owner_cannot_transfer_ownership() {
    let ledger = TokenLedger::new(king()).unwrap();

    let err = ledger.transfer_ownership(Some(jack()), queen()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(ledger.owner(), king());
    assert!(ledger.events().is_empty());
}

#[test]
fn cannot_transfer_ownership_to_zero_address() {
    let ledger = TokenLedger::new(king()).unwrap();
    let zero = Address::parse_target("0x0000000000000000000000000000000000000000").unwrap();

    let err = ledger.transfer_ownership(zero, king()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(ledger.owner(), king());
}

#[test]
fn non_owner_check_precedes_argument_check() {
    let ledger = TokenLedger::new(king()).unwrap();
    let err = ledger.transfer_ownership(None, queen()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn changes_rate() {
    let ledger = TokenLedger::new(king()).unwrap();

    let event = ledger.change_rate(150, king()).unwrap();
    assert_eq!(
        event,
        LedgerEvent::RateChanged {
            previous_rate: 270,
            new_rate: 150,
        }
    );
    assert_eq!(ledger.rate(), 150);
}

#[test]
fn rejects_zero_rate() {
    let ledger = TokenLedger::new(king()).unwrap();

    let err = ledger.change_rate(0, king()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(ledger.rate(), 270);
}

#[test]
fn non_owner_cannot_change_rate() {
    let ledger = TokenLedger::new(king()).unwrap();

    let err = ledger.change_rate(150, queen()).unwrap_err();
    assert_eq!(err, LedgerError::unauthorized(queen(), king()));
    assert_eq!(ledger.rate(), 270);
}

#[test]
fn buys_tokens() {
    let ledger = TokenLedger::new(king()).unwrap();
    let pool = ledger.pool_address();
    let payment = wei_to_whole_units(10 * WEI_PER_ETHER).unwrap();
    let rate = ledger.rate();
    let pool_before = ledger.balance_of(&pool);
    let queen_before = ledger.balance_of(&queen());

    let event = ledger.buy_tokens(Some(queen()), king(), payment).unwrap();

    assert_eq!(
        event,
        LedgerEvent::TokenPurchase {
            purchaser: king(),
            beneficiary: queen(),
            tokens: 2700,
            buy_rate: rate,
        }
    );
    assert_eq!(ledger.balance_of(&pool), pool_before - 2700);
    assert_eq!(ledger.balance_of(&pool), 9_998_997_300);
    assert_eq!(ledger.balance_of(&queen()), queen_before + 2700);
    assert!(ledger.verify_supply().is_ok());
}

#[test]
fn purchase_uses_rate_at_call_time() {
    let ledger = TokenLedger::new(king()).unwrap();
    ledger.change_rate(3, king()).unwrap();

    let event = ledger.buy_tokens(Some(jack()), queen(), 7).unwrap();
    assert_matches!(
        event,
        LedgerEvent::TokenPurchase {
            tokens: 21,
            buy_rate: 3,
            ..
        }
    );
}

#[test]
fn rejects_zero_beneficiary() {
    let ledger = TokenLedger::new(king()).unwrap();
    let before = snapshot(&ledger);

    let err = ledger.buy_tokens(None, king(), 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(snapshot(&ledger), before);
}

#[test]
fn rejects_owner_as_beneficiary() {
    let ledger = TokenLedger::new(king()).unwrap();
    let before = snapshot(&ledger);

    let err = ledger.buy_tokens(Some(king()), king(), 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    // the rule follows the current owner, not the creator
    ledger.transfer_ownership(Some(queen()), king()).unwrap();
    assert!(ledger.buy_tokens(Some(queen()), jack(), 10).is_err());
    assert!(ledger.buy_tokens(Some(king()), jack(), 10).is_ok());

    assert_eq!(ledger.balance_of(&queen()), 0);
    assert_ne!(snapshot(&ledger), before);
}

#[test]
fn rejects_zero_payment() {
    let ledger = TokenLedger::new(king()).unwrap();
    let before = snapshot(&ledger);

    let err = ledger.buy_tokens(Some(queen()), king(), 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(snapshot(&ledger), before);
}

#[test]
fn rejects_purchase_larger_than_pool() {
    let ledger = TokenLedger::new(king()).unwrap();

    // 270 * 40_000_000 exceeds the 9.999 billion supply
    let err = ledger.buy_tokens(Some(queen()), king(), 40_000_000).unwrap_err();
    assert_eq!(
        err,
        LedgerError::insufficient_pool(SUPPLY, 10_800_000_000)
    );
    assert_eq!(ledger.balance_of(&queen()), 0);
}

#[test]
fn rejects_overflowing_purchase() {
    let ledger = TokenLedger::new(king()).unwrap();
    let err = ledger.buy_tokens(Some(queen()), king(), u64::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn journal_records_one_event_per_success() {
    let ledger = TokenLedger::new(king()).unwrap();

    ledger.buy_tokens(Some(queen()), king(), 1).unwrap();
    let _ = ledger.buy_tokens(Some(king()), king(), 1);
    ledger.change_rate(100, king()).unwrap();
    let _ = ledger.change_rate(100, queen());
    ledger.transfer_ownership(Some(jack()), king()).unwrap();

    let names: Vec<_> = ledger
        .events()
        .iter()
        .map(|record| (record.sequence, record.event.name()))
        .collect();
    assert_eq!(
        names,
        vec![
            (1, "TokenPurchase"),
            (2, "RateChanged"),
            (3, "OwnerTransferred"),
        ]
    );
}

#[test]
fn explicit_zero_address_is_never_a_target() {
    let ledger = TokenLedger::new(king()).unwrap();
    let before = snapshot(&ledger);

    let err = ledger
        .transfer_ownership(Some(Address::ZERO), king())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(ledger.owner(), king());

    let err = ledger.buy_tokens(Some(Address::ZERO), king(), 10).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(ledger.balance_of(&Address::ZERO), 0);

    assert_eq!(snapshot(&ledger), before);
    assert!(ledger.events().is_empty());
}

#[test]
fn zero_creator_cannot_build_a_ledger() {
    let err = TokenLedger::new(Address::ZERO).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn rejects_pool_as_beneficiary() {
    let ledger = TokenLedger::new(king()).unwrap();
    let pool = ledger.pool_address();

    let err = ledger.buy_tokens(Some(pool), queen(), 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(ledger.balance_of(&pool), SUPPLY);
    assert!(ledger.events().is_empty());
}
