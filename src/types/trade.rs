use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradingError;

pub type TradeId = i64;
pub type Qty = i64;

/// Longest symbol accepted anywhere (matches the VARCHAR(10) column).
pub const MAX_SYMBOL_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Present in the schema for every trade; nothing transitions it past Active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    #[default]
    Active,
    Closed,
}

/// Immutable log entry, one per placed trade. Id and timestamp are assigned
/// by the database on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Qty,
    pub price: Decimal,
    pub executed_at: DateTime<Utc>,
    pub portfolio_id: String,
    pub status: TradeStatus,
}

/// Incoming trade placement request. Price is optional; when absent the
/// execution price comes from the quote source. Portfolio defaults to the
/// configured one.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Qty,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub portfolio_id: Option<String>,
}

/// Validated, normalized form of a `TradeRequest` ready for the ledger.
#[derive(Debug, Clone)]
pub struct TradeOrder {
    pub symbol: String,
    pub side: TradeSide,
    pub quantity: Qty,
    pub price: Option<Decimal>,
    pub portfolio_id: String,
}

impl TradeRequest {
    /// Validate and normalize: symbol uppercased, bounds checked, portfolio
    /// defaulted.
    pub fn into_order(self, default_portfolio_id: &str) -> Result<TradeOrder, TradingError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(TradingError::InvalidRequest("symbol is required".into()));
        }
        if symbol.len() > MAX_SYMBOL_LEN {
            return Err(TradingError::InvalidRequest(format!(
                "symbol must be at most {MAX_SYMBOL_LEN} characters"
            )));
        }
        if self.quantity <= 0 {
            return Err(TradingError::InvalidRequest(
                "quantity must be a positive integer".into(),
            ));
        }
        if let Some(price) = self.price
            && price <= Decimal::ZERO
        {
            return Err(TradingError::InvalidRequest(
                "price must be positive".into(),
            ));
        }
        Ok(TradeOrder {
            symbol,
            side: self.side,
            quantity: self.quantity,
            price: self.price,
            portfolio_id: self
                .portfolio_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| default_portfolio_id.to_string()),
        })
    }
}

/// Paginated trade history (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeHistory {
    pub trades: Vec<Trade>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
}
