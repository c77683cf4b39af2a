//! Quote resolution: current market prices from an external feed.
//!
//! The feed is a best-effort collaborator. Single-symbol lookups fail with
//! `QuoteUnavailable`; batch lookups omit failed symbols instead of failing
//! the whole call.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::TradingError;

#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current price for one symbol.
    async fn current_price(&self, symbol: &str) -> Result<Decimal, TradingError>;

    /// Current prices for many symbols. Symbols whose lookup failed are
    /// omitted from the result.
    async fn current_prices(&self, symbols: &[String]) -> HashMap<String, Decimal> {
        let mut prices = HashMap::new();
        let mut failed = Vec::new();
        for symbol in symbols {
            match self.current_price(symbol).await {
                Ok(price) => {
                    prices.insert(symbol.clone(), price);
                }
                Err(_) => failed.push(symbol.as_str()),
            }
        }
        if !failed.is_empty() {
            warn!(symbols = ?failed, "failed to fetch prices");
        }
        prices
    }
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    price: Decimal,
}

/// HTTP quote feed: `GET {base}/quote/{SYMBOL}` returning `{"price": …}`.
pub struct HttpPriceSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPriceSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, TradingError> {
        let url = format!("{}/quote/{}", self.base_url.trim_end_matches('/'), symbol);
        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(%symbol, error = %e, "quote request failed");
            TradingError::QuoteUnavailable(symbol.to_string())
        })?;
        if !response.status().is_success() {
            warn!(%symbol, status = %response.status(), "quote feed returned error status");
            return Err(TradingError::QuoteUnavailable(symbol.to_string()));
        }
        let body: QuoteBody = response
            .json()
            .await
            .map_err(|_| TradingError::QuoteUnavailable(symbol.to_string()))?;
        if body.price <= Decimal::ZERO {
            return Err(TradingError::QuoteUnavailable(symbol.to_string()));
        }
        debug!(%symbol, price = %body.price, "fetched price");
        Ok(body.price)
    }
}

/// Fixed symbol→price map. Used by tests and offline runs; unknown symbols
/// behave like a feed outage.
#[derive(Debug, Default, Clone)]
pub struct StaticPriceSource {
    prices: HashMap<String, Decimal>,
}

impl StaticPriceSource {
    pub fn new(prices: impl IntoIterator<Item = (String, Decimal)>) -> Self {
        Self {
            prices: prices.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn current_price(&self, symbol: &str) -> Result<Decimal, TradingError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| TradingError::QuoteUnavailable(symbol.to_string()))
    }
}
