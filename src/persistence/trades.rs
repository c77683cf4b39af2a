//! Trade persistence: append-only insert inside the placement transaction,
//! id lookup, and paginated history for the API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::types::trade::{Qty, Trade, TradeSide, TradeStatus};

fn side_to_str(side: TradeSide) -> &'static str {
    match side {
        TradeSide::Buy => "BUY",
        TradeSide::Sell => "SELL",
    }
}

fn str_to_side(s: &str) -> Option<TradeSide> {
    match s {
        "BUY" => Some(TradeSide::Buy),
        "SELL" => Some(TradeSide::Sell),
        _ => None,
    }
}

fn str_to_status(s: &str) -> Option<TradeStatus> {
    match s {
        "ACTIVE" => Some(TradeStatus::Active),
        "CLOSED" => Some(TradeStatus::Closed),
        _ => None,
    }
}

#[derive(Debug, FromRow)]
pub struct TradeRow {
    pub id: i64,
    pub symbol: String,
    pub side: String,
    pub quantity: i64,
    pub price: Decimal,
    pub executed_at: DateTime<Utc>,
    pub portfolio_id: String,
    pub status: String,
}

/// Convert a TradeRow to a Trade. Returns None for rows with an
/// unrecognized side or status.
pub fn trade_row_to_trade(row: &TradeRow) -> Option<Trade> {
    Some(Trade {
        id: row.id,
        symbol: row.symbol.clone(),
        side: str_to_side(&row.side)?,
        quantity: row.quantity,
        price: row.price,
        executed_at: row.executed_at,
        portfolio_id: row.portfolio_id.clone(),
        status: str_to_status(&row.status)?,
    })
}

/// Append one trade inside the placement transaction. Id, timestamp, and
/// status are assigned by the database.
pub async fn insert_trade(
    conn: &mut PgConnection,
    symbol: &str,
    side: TradeSide,
    quantity: Qty,
    price: Decimal,
    portfolio_id: &str,
) -> Result<Trade, sqlx::Error> {
    let (id, executed_at): (i64, DateTime<Utc>) = sqlx::query_as(
        "INSERT INTO trades (symbol, side, quantity, price, portfolio_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id, executed_at",
    )
    .bind(symbol)
    .bind(side_to_str(side))
    .bind(quantity)
    .bind(price)
    .bind(portfolio_id)
    .fetch_one(conn)
    .await?;
    Ok(Trade {
        id,
        symbol: symbol.to_string(),
        side,
        quantity,
        price,
        executed_at,
        portfolio_id: portfolio_id.to_string(),
        status: TradeStatus::Active,
    })
}

/// Get a single trade by id (for GET /trades/{id}).
pub async fn get_trade_by_id(pool: &PgPool, trade_id: i64) -> Result<Option<TradeRow>, sqlx::Error> {
    sqlx::query_as::<_, TradeRow>(
        "SELECT id, symbol, side, quantity, price, executed_at, portfolio_id, status \
         FROM trades WHERE id = $1",
    )
    .bind(trade_id)
    .fetch_optional(pool)
    .await
}

/// List trades for a portfolio, newest first (for GET /trades).
pub async fn list_trades(
    pool: &PgPool,
    portfolio_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<TradeRow>, sqlx::Error> {
    sqlx::query_as::<_, TradeRow>(
        "SELECT id, symbol, side, quantity, price, executed_at, portfolio_id, status \
         FROM trades WHERE portfolio_id = $1 \
         ORDER BY executed_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(portfolio_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Total number of trades for a portfolio.
pub async fn count_trades(pool: &PgPool, portfolio_id: &str) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM trades WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
