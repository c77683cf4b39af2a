use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::trade::Qty;

/// One row per portfolio. Total value is never stored; the P&L report
/// recomputes it from cash plus mark-to-market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub portfolio_id: String,
    pub cash_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// P&L of a single open position marked to a current price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionPnl {
    pub symbol: String,
    pub quantity: Qty,
    pub avg_price: Decimal,
    pub current_price: Decimal,
    pub invested: Decimal,
    pub current_value: Decimal,
    pub pnl: Decimal,
    pub pnl_percent: Decimal,
}

/// Full portfolio P&L breakdown plus aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioPnl {
    pub portfolio_id: String,
    pub cash_balance: Decimal,
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub total_pnl: Decimal,
    pub total_portfolio_value: Decimal,
    pub positions: Vec<PositionPnl>,
}
