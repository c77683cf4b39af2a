//! Position persistence: locked reads inside the trade transaction, plus
//! upsert-or-delete and list/get for the API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::types::position::Position;
use crate::types::trade::Qty;

#[derive(Debug, FromRow)]
pub struct PositionRow {
    pub symbol: String,
    pub net_quantity: i64,
    pub avg_price: Decimal,
    pub total_invested: Decimal,
    pub last_updated: DateTime<Utc>,
    pub portfolio_id: String,
}

pub fn position_row_to_position(row: &PositionRow) -> Position {
    Position {
        symbol: row.symbol.clone(),
        net_quantity: row.net_quantity,
        avg_price: row.avg_price,
        total_invested: row.total_invested,
        last_updated: row.last_updated,
        portfolio_id: row.portfolio_id.clone(),
    }
}

/// Get a position (for GET /positions/{symbol}).
pub async fn get_position(
    pool: &PgPool,
    symbol: &str,
    portfolio_id: &str,
) -> Result<Option<PositionRow>, sqlx::Error> {
    sqlx::query_as::<_, PositionRow>(
        "SELECT symbol, net_quantity, avg_price, total_invested, last_updated, portfolio_id \
         FROM positions WHERE symbol = $1 AND portfolio_id = $2",
    )
    .bind(symbol)
    .bind(portfolio_id)
    .fetch_optional(pool)
    .await
}

/// Lock and return the position row inside the placement transaction.
/// Must be called after the portfolio row lock so lock order is fixed.
pub async fn get_position_for_update(
    conn: &mut PgConnection,
    symbol: &str,
    portfolio_id: &str,
) -> Result<Option<PositionRow>, sqlx::Error> {
    sqlx::query_as::<_, PositionRow>(
        "SELECT symbol, net_quantity, avg_price, total_invested, last_updated, portfolio_id \
         FROM positions WHERE symbol = $1 AND portfolio_id = $2 FOR UPDATE",
    )
    .bind(symbol)
    .bind(portfolio_id)
    .fetch_optional(conn)
    .await
}

/// List open positions for a portfolio, ordered by symbol.
pub async fn list_positions(
    pool: &PgPool,
    portfolio_id: &str,
) -> Result<Vec<PositionRow>, sqlx::Error> {
    sqlx::query_as::<_, PositionRow>(
        "SELECT symbol, net_quantity, avg_price, total_invested, last_updated, portfolio_id \
         FROM positions WHERE portfolio_id = $1 AND net_quantity > 0 ORDER BY symbol",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await
}

/// Insert or update a position (on conflict of the (symbol, portfolio_id)
/// key).
pub async fn upsert_position(
    conn: &mut PgConnection,
    symbol: &str,
    portfolio_id: &str,
    net_quantity: Qty,
    avg_price: Decimal,
    total_invested: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO positions (symbol, portfolio_id, net_quantity, avg_price, total_invested) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (symbol, portfolio_id) DO UPDATE \
         SET net_quantity = $3, avg_price = $4, total_invested = $5, last_updated = now()",
    )
    .bind(symbol)
    .bind(portfolio_id)
    .bind(net_quantity)
    .bind(avg_price)
    .bind(total_invested)
    .execute(conn)
    .await?;
    Ok(())
}

/// Remove a position once its quantity returns to zero.
pub async fn delete_position(
    conn: &mut PgConnection,
    symbol: &str,
    portfolio_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM positions WHERE symbol = $1 AND portfolio_id = $2")
        .bind(symbol)
        .bind(portfolio_id)
        .execute(conn)
        .await?;
    Ok(())
}
