//! Portfolio persistence: cash balance reads and updates.
//!
//! Functions taking `&mut PgConnection` are meant to run inside the trade
//! placement transaction; the `FOR UPDATE` variants take the row lock that
//! serializes concurrent placements against the same portfolio.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection, PgPool};

use crate::types::portfolio::Portfolio;

#[derive(Debug, FromRow)]
pub struct PortfolioRow {
    pub portfolio_id: String,
    pub cash_balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub fn portfolio_row_to_portfolio(row: &PortfolioRow) -> Portfolio {
    Portfolio {
        portfolio_id: row.portfolio_id.clone(),
        cash_balance: row.cash_balance,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

/// Seed a portfolio with its opening cash balance if it does not exist yet.
pub async fn ensure_portfolio(
    pool: &PgPool,
    portfolio_id: &str,
    opening_cash: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO portfolio (portfolio_id, cash_balance) VALUES ($1, $2) \
         ON CONFLICT (portfolio_id) DO NOTHING",
    )
    .bind(portfolio_id)
    .bind(opening_cash)
    .execute(pool)
    .await?;
    Ok(())
}

/// Get a portfolio (for GET /portfolio).
pub async fn get_portfolio(
    pool: &PgPool,
    portfolio_id: &str,
) -> Result<Option<PortfolioRow>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>(
        "SELECT portfolio_id, cash_balance, created_at, updated_at \
         FROM portfolio WHERE portfolio_id = $1",
    )
    .bind(portfolio_id)
    .fetch_optional(pool)
    .await
}

/// Lock the portfolio row and return its cash balance. Returns None when the
/// portfolio does not exist.
pub async fn cash_balance_for_update(
    conn: &mut PgConnection,
    portfolio_id: &str,
) -> Result<Option<Decimal>, sqlx::Error> {
    let row: Option<(Decimal,)> =
        sqlx::query_as("SELECT cash_balance FROM portfolio WHERE portfolio_id = $1 FOR UPDATE")
            .bind(portfolio_id)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(|(cash,)| cash))
}

/// Apply a signed cash delta inside the placement transaction.
pub async fn adjust_cash_balance(
    conn: &mut PgConnection,
    portfolio_id: &str,
    delta: Decimal,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE portfolio SET cash_balance = cash_balance + $1, updated_at = now() \
         WHERE portfolio_id = $2",
    )
    .bind(delta)
    .bind(portfolio_id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Overwrite the cash balance (for PUT /portfolio/cash). Returns the updated
/// row, or None when the portfolio does not exist.
pub async fn set_cash_balance(
    pool: &PgPool,
    portfolio_id: &str,
    cash_balance: Decimal,
) -> Result<Option<PortfolioRow>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>(
        "UPDATE portfolio SET cash_balance = $1, updated_at = now() \
         WHERE portfolio_id = $2 \
         RETURNING portfolio_id, cash_balance, created_at, updated_at",
    )
    .bind(cash_balance)
    .bind(portfolio_id)
    .fetch_optional(pool)
    .await
}
