//! Position arithmetic integration tests: apply_trade, trade_value.
//! Testable without a database.

use paper_trading::error::TradingError;
use paper_trading::ledger::{PositionChange, PositionState, apply_trade, trade_value};
use paper_trading::types::trade::TradeSide;
use rust_decimal_macros::dec;

fn set(change: PositionChange) -> PositionState {
    match change {
        PositionChange::Set(state) => state,
        PositionChange::Remove => panic!("expected an open position, got a removal"),
    }
}

#[test]
fn buy_opens_position_at_trade_price() {
    let change = apply_trade(None, TradeSide::Buy, 10, dec!(150)).unwrap();
    let state = set(change);
    assert_eq!(state.net_quantity, 10);
    assert_eq!(state.avg_price, dec!(150));
    assert_eq!(state.total_invested, dec!(1500));
}

#[test]
fn buy_blends_weighted_average() {
    let existing = PositionState {
        net_quantity: 10,
        avg_price: dec!(150),
        total_invested: dec!(1500),
    };
    let state = set(apply_trade(Some(&existing), TradeSide::Buy, 10, dec!(170)).unwrap());
    assert_eq!(state.net_quantity, 20);
    assert_eq!(state.avg_price, dec!(160));
    assert_eq!(state.total_invested, dec!(3200));
}

#[test]
fn partial_sell_keeps_avg_price_and_scales_invested() {
    let existing = PositionState {
        net_quantity: 20,
        avg_price: dec!(160),
        total_invested: dec!(3200),
    };
    let state = set(apply_trade(Some(&existing), TradeSide::Sell, 5, dec!(200)).unwrap());
    assert_eq!(state.net_quantity, 15);
    assert_eq!(state.avg_price, dec!(160));
    assert_eq!(state.total_invested, dec!(2400));
}

#[test]
fn full_sell_removes_position() {
    let existing = PositionState {
        net_quantity: 15,
        avg_price: dec!(160),
        total_invested: dec!(2400),
    };
    let change = apply_trade(Some(&existing), TradeSide::Sell, 15, dec!(180)).unwrap();
    assert_eq!(change, PositionChange::Remove);
}

#[test]
fn oversell_rejected() {
    let existing = PositionState {
        net_quantity: 10,
        avg_price: dec!(150),
        total_invested: dec!(1500),
    };
    let err = apply_trade(Some(&existing), TradeSide::Sell, 11, dec!(150)).unwrap_err();
    match err {
        TradingError::InsufficientShares {
            required,
            available,
        } => {
            assert_eq!(required, 11);
            assert_eq!(available, 10);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn sell_without_position_rejected() {
    let err = apply_trade(None, TradeSide::Sell, 5, dec!(150)).unwrap_err();
    match err {
        TradingError::InsufficientShares {
            required,
            available,
        } => {
            assert_eq!(required, 5);
            assert_eq!(available, 0);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn weighted_average_rounds_to_stored_precision() {
    let existing = PositionState {
        net_quantity: 3,
        avg_price: dec!(10.0001),
        total_invested: dec!(30.0003),
    };
    let state = set(apply_trade(Some(&existing), TradeSide::Buy, 1, dec!(10.0002)).unwrap());
    assert_eq!(state.total_invested, dec!(40.0005));
    // 40.0005 / 4 = 10.000125, rounded half away from zero to 4 dp.
    assert_eq!(state.avg_price, dec!(10.0001));
}

#[test]
fn partial_sell_rounds_scaled_invested() {
    let existing = PositionState {
        net_quantity: 3,
        avg_price: dec!(3.3334),
        total_invested: dec!(10.0001),
    };
    let state = set(apply_trade(Some(&existing), TradeSide::Sell, 1, dec!(4)).unwrap());
    // 10.0001 * 2 / 3 = 6.66673…, rounded to 4 dp.
    assert_eq!(state.total_invested, dec!(6.6667));
    assert_eq!(state.avg_price, dec!(3.3334));
}

#[test]
fn trade_value_rounds_half_away_from_zero() {
    assert_eq!(trade_value(dec!(0.33335), 1), dec!(0.3334));
    assert_eq!(trade_value(dec!(150), 10), dec!(1500));
}

#[test]
fn worked_example_full_sequence() {
    let mut cash = dec!(100000);

    // BUY 10 AAPL @ 150
    let state = set(apply_trade(None, TradeSide::Buy, 10, dec!(150)).unwrap());
    cash -= trade_value(dec!(150), 10);
    assert_eq!(cash, dec!(98500));
    assert_eq!(state.total_invested, dec!(1500));

    // BUY 10 AAPL @ 170
    let state = set(apply_trade(Some(&state), TradeSide::Buy, 10, dec!(170)).unwrap());
    cash -= trade_value(dec!(170), 10);
    assert_eq!(cash, dec!(96800));
    assert_eq!(state.net_quantity, 20);
    assert_eq!(state.avg_price, dec!(160));
    assert_eq!(state.total_invested, dec!(3200));

    // SELL 5 AAPL @ 200
    let state = set(apply_trade(Some(&state), TradeSide::Sell, 5, dec!(200)).unwrap());
    cash += trade_value(dec!(200), 5);
    assert_eq!(cash, dec!(97800));
    assert_eq!(state.net_quantity, 15);
    assert_eq!(state.avg_price, dec!(160));
    assert_eq!(state.total_invested, dec!(2400));
}
