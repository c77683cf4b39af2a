//! Ledger engine: weighted-average position arithmetic and the atomic
//! trade placement transaction. The arithmetic is pure and testable
//! without a database.

use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use tracing::info;

use crate::error::TradingError;
use crate::persistence;
use crate::quotes::PriceSource;
use crate::types::trade::{Qty, Trade, TradeOrder, TradeSide};

/// Fractional digits of every monetary value (NUMERIC(…,4) columns).
pub const MONEY_DP: u32 = 4;

/// Round to the stored precision, half away from zero like the database.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Cost of a trade: price × quantity at stored precision.
pub fn trade_value(price: Decimal, quantity: Qty) -> Decimal {
    round_money(price * Decimal::from(quantity))
}

/// Position state relevant to the update arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionState {
    pub net_quantity: Qty,
    pub avg_price: Decimal,
    pub total_invested: Decimal,
}

/// Outcome of applying one trade to a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionChange {
    Set(PositionState),
    Remove,
}

/// Apply one trade to an optional existing position.
///
/// Buys blend into the weighted-average cost basis; sells leave the average
/// untouched and scale the invested amount with the remaining quantity. A
/// sell that empties the position removes it.
pub fn apply_trade(
    existing: Option<&PositionState>,
    side: TradeSide,
    quantity: Qty,
    price: Decimal,
) -> Result<PositionChange, TradingError> {
    match (side, existing) {
        (TradeSide::Buy, None) => Ok(PositionChange::Set(PositionState {
            net_quantity: quantity,
            avg_price: price,
            total_invested: trade_value(price, quantity),
        })),
        (TradeSide::Buy, Some(pos)) => {
            let net_quantity = pos.net_quantity + quantity;
            let total_invested = pos.total_invested + trade_value(price, quantity);
            let avg_price = round_money(total_invested / Decimal::from(net_quantity));
            Ok(PositionChange::Set(PositionState {
                net_quantity,
                avg_price,
                total_invested,
            }))
        }
        (TradeSide::Sell, Some(pos)) => {
            let remaining = pos.net_quantity - quantity;
            if remaining < 0 {
                return Err(TradingError::InsufficientShares {
                    required: quantity,
                    available: pos.net_quantity,
                });
            }
            if remaining == 0 {
                return Ok(PositionChange::Remove);
            }
            // Realized gain/loss never feeds back into the cost basis.
            let total_invested = round_money(
                pos.total_invested * Decimal::from(remaining) / Decimal::from(pos.net_quantity),
            );
            Ok(PositionChange::Set(PositionState {
                net_quantity: remaining,
                avg_price: pos.avg_price,
                total_invested,
            }))
        }
        // Unreachable after the sufficient-shares check, kept as a guard.
        (TradeSide::Sell, None) => Err(TradingError::InsufficientShares {
            required: quantity,
            available: 0,
        }),
    }
}

/// Place a trade: resolve the execution price, then validate and update the
/// trade log, position, and cash balance in one locked transaction.
///
/// The portfolio row and the position row are locked `FOR UPDATE` in that
/// order, so concurrent placements against the same (portfolio, symbol)
/// serialize and cannot validate against a stale snapshot. Any error rolls
/// the transaction back; nothing is persisted.
pub async fn place_trade(
    pool: &PgPool,
    prices: &dyn PriceSource,
    order: &TradeOrder,
) -> Result<Trade, TradingError> {
    // The quote feed is slow and external; resolve before taking locks.
    let price = match order.price {
        Some(price) => price,
        None => prices.current_price(&order.symbol).await?,
    };
    let value = trade_value(price, order.quantity);

    let mut tx = pool.begin().await?;

    let cash_balance = persistence::cash_balance_for_update(&mut *tx, &order.portfolio_id)
        .await?
        .ok_or_else(|| TradingError::PortfolioNotFound(order.portfolio_id.clone()))?;
    let existing =
        persistence::get_position_for_update(&mut *tx, &order.symbol, &order.portfolio_id).await?;

    match order.side {
        TradeSide::Buy => {
            if cash_balance < value {
                return Err(TradingError::InsufficientFunds {
                    required: value,
                    available: cash_balance,
                });
            }
        }
        TradeSide::Sell => {
            let available = existing.as_ref().map(|p| p.net_quantity).unwrap_or(0);
            if available < order.quantity {
                return Err(TradingError::InsufficientShares {
                    required: order.quantity,
                    available,
                });
            }
        }
    }

    let trade = persistence::insert_trade(
        &mut *tx,
        &order.symbol,
        order.side,
        order.quantity,
        price,
        &order.portfolio_id,
    )
    .await?;

    let state = existing.map(|row| PositionState {
        net_quantity: row.net_quantity,
        avg_price: row.avg_price,
        total_invested: row.total_invested,
    });
    match apply_trade(state.as_ref(), order.side, order.quantity, price)? {
        PositionChange::Set(next) => {
            persistence::upsert_position(
                &mut *tx,
                &order.symbol,
                &order.portfolio_id,
                next.net_quantity,
                next.avg_price,
                next.total_invested,
            )
            .await?;
        }
        PositionChange::Remove => {
            persistence::delete_position(&mut *tx, &order.symbol, &order.portfolio_id).await?;
        }
    }

    let cash_delta = match order.side {
        TradeSide::Buy => -value,
        TradeSide::Sell => value,
    };
    persistence::adjust_cash_balance(&mut *tx, &order.portfolio_id, cash_delta).await?;

    tx.commit().await?;

    info!(
        portfolio_id = %trade.portfolio_id,
        symbol = %trade.symbol,
        side = ?trade.side,
        quantity = trade.quantity,
        price = %trade.price,
        "trade executed"
    );
    Ok(trade)
}

/// Close a position by selling the full held quantity at market price.
pub async fn close_position(
    pool: &PgPool,
    prices: &dyn PriceSource,
    symbol: &str,
    portfolio_id: &str,
) -> Result<Trade, TradingError> {
    let position = persistence::get_position(pool, symbol, portfolio_id)
        .await?
        .ok_or_else(|| TradingError::PositionNotFound(symbol.to_string()))?;
    let order = TradeOrder {
        symbol: symbol.to_string(),
        side: TradeSide::Sell,
        quantity: position.net_quantity,
        price: None,
        portfolio_id: portfolio_id.to_string(),
    };
    place_trade(pool, prices, &order).await
}
