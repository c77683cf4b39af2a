//! Runtime settings, read once at startup from the environment (a local
//! `.env` file is honored via dotenvy).

use rust_decimal::Decimal;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub quote_api_url: String,
    pub default_portfolio_id: String,
    pub default_cash_balance: Decimal,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_QUOTE_API_URL: &str = "http://localhost:8080";
const DEFAULT_PORTFOLIO_ID: &str = "default";
const DEFAULT_CASH_BALANCE: &str = "100000.00";

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| SettingsError::Missing("DATABASE_URL"))?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let quote_api_url =
            env::var("QUOTE_API_URL").unwrap_or_else(|_| DEFAULT_QUOTE_API_URL.to_string());
        let default_portfolio_id =
            env::var("DEFAULT_PORTFOLIO_ID").unwrap_or_else(|_| DEFAULT_PORTFOLIO_ID.to_string());
        let raw_cash = env::var("DEFAULT_CASH_BALANCE")
            .unwrap_or_else(|_| DEFAULT_CASH_BALANCE.to_string());
        let default_cash_balance = raw_cash.parse().map_err(|_| SettingsError::Invalid {
            name: "DEFAULT_CASH_BALANCE",
            value: raw_cash,
        })?;

        Ok(Self {
            database_url,
            bind_addr,
            quote_api_url,
            default_portfolio_id,
            default_cash_balance,
        })
    }
}
