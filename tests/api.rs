//! HTTP surface tests: request validation and quote endpoints.
//!
//! The pool is created lazily and never connects — every path exercised
//! here rejects or answers before touching storage.

use paper_trading::api::routes::{AppState, app_router};
use paper_trading::quotes::StaticPriceSource;
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

fn test_app_state() -> AppState {
    let db = PgPoolOptions::new()
        .connect_lazy("postgres://localhost:5432/paper_trading_unused")
        .unwrap();
    let prices = StaticPriceSource::new([
        ("AAPL".to_string(), dec!(150.25)),
        ("MSFT".to_string(), dec!(410.10)),
    ]);
    AppState {
        db,
        prices: Arc::new(prices),
        default_portfolio_id: "default".to_string(),
    }
}

/// Spawn app on a random port and return (base_url, guard that keeps server running).
async fn spawn_app(state: AppState) -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    let app = app_router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (base_url, handle)
}

#[tokio::test]
async fn health_returns_healthy() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.text().await.unwrap(), "healthy");
}

#[tokio::test]
async fn place_trade_empty_symbol_returns_400() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/trades", base_url))
        .json(&serde_json::json!({ "symbol": "", "side": "BUY", "quantity": 10 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(
        json.get("error")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("symbol")
    );
}

#[tokio::test]
async fn place_trade_zero_quantity_returns_400() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/trades", base_url))
        .json(&serde_json::json!({ "symbol": "AAPL", "side": "BUY", "quantity": 0 }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(
        json.get("error")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("quantity")
    );
}

#[tokio::test]
async fn place_trade_overlong_symbol_returns_400() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/trades", base_url))
        .json(&serde_json::json!({
            "symbol": "WAYTOOLONGSYMBOL",
            "side": "SELL",
            "quantity": 1
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn place_trade_nonpositive_price_returns_400() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/trades", base_url))
        .json(&serde_json::json!({
            "symbol": "AAPL",
            "side": "BUY",
            "quantity": 1,
            "price": "-5.00"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(
        json.get("error")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("price")
    );
}

#[tokio::test]
async fn get_price_returns_quote_and_uppercases_symbol() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/prices/aapl", base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let json: serde_json::Value = res.json().await.unwrap();
    assert_eq!(json.get("symbol").and_then(|v| v.as_str()), Some("AAPL"));
    assert_eq!(json.get("price").and_then(|v| v.as_str()), Some("150.25"));
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn get_price_unknown_symbol_returns_400() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/prices/NOPE", base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(
        json.get("error")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("NOPE")
    );
}

#[tokio::test]
async fn bulk_prices_omit_failed_symbols() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/prices/bulk", base_url))
        .json(&serde_json::json!({ "symbols": ["AAPL", "MSFT", "NOPE"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let json: serde_json::Value = res.json().await.unwrap();
    let prices = json.get("prices").unwrap().as_object().unwrap();
    assert_eq!(prices.len(), 2);
    assert!(prices.contains_key("AAPL"));
    assert!(prices.contains_key("MSFT"));
    assert!(!prices.contains_key("NOPE"));
}

#[tokio::test]
async fn update_cash_nonpositive_balance_returns_400() {
    let (base_url, _handle) = spawn_app(test_app_state()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(format!("{}/api/v1/portfolio/cash", base_url))
        .json(&serde_json::json!({ "cash_balance": "0" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(
        json.get("error")
            .unwrap()
            .as_str()
            .unwrap()
            .contains("cash_balance")
    );
}
