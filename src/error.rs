//! Error taxonomy for the trading core and its HTTP mapping.
//!
//! All variants except `Database` are caller-facing validation or not-found
//! failures; none are retryable. Any of them aborts the surrounding trade
//! transaction, which rolls back on drop.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde_json::json;
use thiserror::Error;

use crate::types::trade::Qty;

#[derive(Debug, Error)]
pub enum TradingError {
    #[error("portfolio not found: {0}")]
    PortfolioNotFound(String),

    #[error("insufficient funds: required ${required}, available ${available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error("insufficient shares: required {required}, available {available}")]
    InsufficientShares { required: Qty, available: Qty },

    #[error("price not available for symbol: {0}")]
    QuoteUnavailable(String),

    #[error("trade not found: {0}")]
    TradeNotFound(i64),

    #[error("position not found for symbol: {0}")]
    PositionNotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),
}

impl TradingError {
    fn status_code(&self) -> StatusCode {
        match self {
            TradingError::PortfolioNotFound(_)
            | TradingError::TradeNotFound(_)
            | TradingError::PositionNotFound(_) => StatusCode::NOT_FOUND,
            TradingError::InsufficientFunds { .. }
            | TradingError::InsufficientShares { .. }
            | TradingError::QuoteUnavailable(_)
            | TradingError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            TradingError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TradingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            // Storage failures surface as an opaque error; the cause goes to
            // the log, not to the caller.
            TradingError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": detail }))).into_response()
    }
}
