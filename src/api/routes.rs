//! HTTP surface: axum router, shared state, and handlers. Thin glue over
//! the ledger, P&L, and quote modules.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::TradingError;
use crate::ledger;
use crate::persistence;
use crate::pnl;
use crate::quotes::PriceSource;
use crate::types::portfolio::{Portfolio, PortfolioPnl};
use crate::types::position::Position;
use crate::types::trade::{Trade, TradeHistory, TradeRequest};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub prices: Arc<dyn PriceSource>,
    pub default_portfolio_id: String,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/trades", post(place_trade).get(trade_history))
        .route("/api/v1/trades/{trade_id}", get(get_trade))
        .route("/api/v1/positions", get(list_positions))
        .route(
            "/api/v1/positions/{symbol}",
            get(get_position).delete(close_position),
        )
        .route("/api/v1/portfolio", get(get_portfolio))
        .route("/api/v1/portfolio/pnl", get(portfolio_pnl))
        .route("/api/v1/portfolio/cash", put(update_cash_balance))
        .route("/api/v1/prices/{symbol}", get(get_price))
        .route("/api/v1/prices/bulk", post(get_bulk_prices))
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

/// Query parameters shared by the portfolio-scoped endpoints.
#[derive(Debug, Deserialize)]
struct PortfolioQuery {
    portfolio_id: Option<String>,
}

impl PortfolioQuery {
    fn resolve(self, state: &AppState) -> String {
        self.portfolio_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| state.default_portfolio_id.clone())
    }
}

async fn place_trade(
    State(state): State<AppState>,
    Json(request): Json<TradeRequest>,
) -> Result<(StatusCode, Json<Trade>), TradingError> {
    let order = request.into_order(&state.default_portfolio_id)?;
    let trade = ledger::place_trade(&state.db, state.prices.as_ref(), &order).await?;
    Ok((StatusCode::CREATED, Json(trade)))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    portfolio_id: Option<String>,
    page: Option<i64>,
    page_size: Option<i64>,
}

async fn trade_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<TradeHistory>, TradingError> {
    let portfolio_id = query
        .portfolio_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| state.default_portfolio_id.clone());
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(50).clamp(1, 100);
    let offset = (page - 1) * page_size;

    let total_count = persistence::count_trades(&state.db, &portfolio_id).await?;
    let trades = persistence::list_trades(&state.db, &portfolio_id, page_size, offset)
        .await?
        .iter()
        .filter_map(persistence::trade_row_to_trade)
        .collect();

    Ok(Json(TradeHistory {
        trades,
        total_count,
        page,
        page_size,
    }))
}

async fn get_trade(
    State(state): State<AppState>,
    Path(trade_id): Path<i64>,
) -> Result<Json<Trade>, TradingError> {
    let trade = persistence::get_trade_by_id(&state.db, trade_id)
        .await?
        .as_ref()
        .and_then(persistence::trade_row_to_trade)
        .ok_or(TradingError::TradeNotFound(trade_id))?;
    Ok(Json(trade))
}

async fn list_positions(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<Vec<Position>>, TradingError> {
    let portfolio_id = query.resolve(&state);
    let positions = persistence::list_positions(&state.db, &portfolio_id)
        .await?
        .iter()
        .map(persistence::position_row_to_position)
        .collect();
    Ok(Json(positions))
}

async fn get_position(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<Position>, TradingError> {
    let portfolio_id = query.resolve(&state);
    let symbol = symbol.to_uppercase();
    let position = persistence::get_position(&state.db, &symbol, &portfolio_id)
        .await?
        .ok_or_else(|| TradingError::PositionNotFound(symbol.clone()))?;
    Ok(Json(persistence::position_row_to_position(&position)))
}

#[derive(Debug, Serialize)]
struct ClosePositionResponse {
    message: String,
    trade: Trade,
}

async fn close_position(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<ClosePositionResponse>, TradingError> {
    let portfolio_id = query.resolve(&state);
    let symbol = symbol.to_uppercase();
    let trade =
        ledger::close_position(&state.db, state.prices.as_ref(), &symbol, &portfolio_id).await?;
    Ok(Json(ClosePositionResponse {
        message: format!("Position for {symbol} closed successfully"),
        trade,
    }))
}

async fn get_portfolio(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<Portfolio>, TradingError> {
    let portfolio_id = query.resolve(&state);
    let portfolio = persistence::get_portfolio(&state.db, &portfolio_id)
        .await?
        .ok_or(TradingError::PortfolioNotFound(portfolio_id))?;
    Ok(Json(persistence::portfolio_row_to_portfolio(&portfolio)))
}

async fn portfolio_pnl(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<PortfolioPnl>, TradingError> {
    let portfolio_id = query.resolve(&state);
    let report = pnl::portfolio_pnl(&state.db, state.prices.as_ref(), &portfolio_id).await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct CashBalanceUpdate {
    cash_balance: Decimal,
}

async fn update_cash_balance(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
    Json(update): Json<CashBalanceUpdate>,
) -> Result<Json<Portfolio>, TradingError> {
    if update.cash_balance <= Decimal::ZERO {
        return Err(TradingError::InvalidRequest(
            "cash_balance must be positive".into(),
        ));
    }
    let portfolio_id = query.resolve(&state);
    let portfolio = persistence::set_cash_balance(&state.db, &portfolio_id, update.cash_balance)
        .await?
        .ok_or(TradingError::PortfolioNotFound(portfolio_id))?;
    Ok(Json(persistence::portfolio_row_to_portfolio(&portfolio)))
}

#[derive(Debug, Serialize)]
struct PriceResponse {
    symbol: String,
    price: Decimal,
    timestamp: DateTime<Utc>,
}

async fn get_price(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<PriceResponse>, TradingError> {
    let symbol = symbol.to_uppercase();
    let price = state.prices.current_price(&symbol).await?;
    Ok(Json(PriceResponse {
        symbol,
        price,
        timestamp: Utc::now(),
    }))
}

#[derive(Debug, Deserialize)]
struct BulkPriceRequest {
    symbols: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BulkPriceResponse {
    prices: HashMap<String, Decimal>,
    timestamp: DateTime<Utc>,
}

async fn get_bulk_prices(
    State(state): State<AppState>,
    Json(request): Json<BulkPriceRequest>,
) -> Result<Json<BulkPriceResponse>, TradingError> {
    let symbols: Vec<String> = request.symbols.iter().map(|s| s.to_uppercase()).collect();
    let prices = state.prices.current_prices(&symbols).await;
    Ok(Json(BulkPriceResponse {
        prices,
        timestamp: Utc::now(),
    }))
}
