use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::trade::Qty;

/// Net holding of a symbol within a portfolio, carrying the weighted-average
/// cost basis. Invariant: `total_invested == net_quantity * avg_price` up to
/// 4-dp rounding. Positions with zero quantity are deleted, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub net_quantity: Qty,
    pub avg_price: Decimal,
    pub total_invested: Decimal,
    pub last_updated: DateTime<Utc>,
    pub portfolio_id: String,
}
