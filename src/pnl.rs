//! Portfolio P&L: mark open positions to current prices and aggregate.
//! The report computation is pure; only the loading is database-bound.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::error::TradingError;
use crate::ledger::round_money;
use crate::persistence;
use crate::quotes::PriceSource;
use crate::types::portfolio::{PortfolioPnl, PositionPnl};
use crate::types::position::Position;

/// Build the P&L report from loaded state. A symbol missing from `prices`
/// is marked at its own average price, reporting zero P&L for that position
/// rather than failing the report.
pub fn build_report(
    portfolio_id: &str,
    cash_balance: Decimal,
    positions: &[Position],
    prices: &HashMap<String, Decimal>,
) -> PortfolioPnl {
    let mut breakdown = Vec::with_capacity(positions.len());
    let mut total_invested = Decimal::ZERO;
    let mut current_value = Decimal::ZERO;
    let mut total_pnl = Decimal::ZERO;

    for position in positions {
        let current_price = prices
            .get(&position.symbol)
            .copied()
            .unwrap_or(position.avg_price);
        let value = round_money(current_price * Decimal::from(position.net_quantity));
        let pnl = value - position.total_invested;
        let pnl_percent = if position.total_invested > Decimal::ZERO {
            round_money(pnl / position.total_invested * Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };

        total_invested += position.total_invested;
        current_value += value;
        total_pnl += pnl;

        breakdown.push(PositionPnl {
            symbol: position.symbol.clone(),
            quantity: position.net_quantity,
            avg_price: position.avg_price,
            current_price,
            invested: position.total_invested,
            current_value: value,
            pnl,
            pnl_percent,
        });
    }

    PortfolioPnl {
        portfolio_id: portfolio_id.to_string(),
        cash_balance,
        total_invested,
        current_value,
        total_pnl,
        total_portfolio_value: current_value + cash_balance,
        positions: breakdown,
    }
}

/// Load open positions, batch-fetch their quotes, and build the report.
/// Read-only; takes no locks and tolerates per-symbol quote failures.
pub async fn portfolio_pnl(
    pool: &PgPool,
    prices: &dyn PriceSource,
    portfolio_id: &str,
) -> Result<PortfolioPnl, TradingError> {
    let portfolio = persistence::get_portfolio(pool, portfolio_id)
        .await?
        .ok_or_else(|| TradingError::PortfolioNotFound(portfolio_id.to_string()))?;

    let positions: Vec<Position> = persistence::list_positions(pool, portfolio_id)
        .await?
        .iter()
        .map(persistence::position_row_to_position)
        .collect();

    let symbols: Vec<String> = positions.iter().map(|p| p.symbol.clone()).collect();
    let quotes = if symbols.is_empty() {
        HashMap::new()
    } else {
        prices.current_prices(&symbols).await
    };

    Ok(build_report(
        portfolio_id,
        portfolio.cash_balance,
        &positions,
        &quotes,
    ))
}
