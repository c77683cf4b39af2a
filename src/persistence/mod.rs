//! Database layer: pool, migrations, and access for trades, positions, and
//! portfolios.

mod pool;
mod portfolio;
mod positions;
mod trades;

pub use pool::{create_pool_and_migrate, run_migrations};
pub use portfolio::{
    PortfolioRow, adjust_cash_balance, cash_balance_for_update, ensure_portfolio, get_portfolio,
    portfolio_row_to_portfolio, set_cash_balance,
};
pub use positions::{
    PositionRow, delete_position, get_position, get_position_for_update, list_positions,
    position_row_to_position, upsert_position,
};
pub use sqlx::PgPool;
pub use trades::{
    TradeRow, count_trades, get_trade_by_id, insert_trade, list_trades, trade_row_to_trade,
};
