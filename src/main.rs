use paper_trading::api::routes::{AppState, app_router};
use paper_trading::config::Settings;
use paper_trading::persistence;
use paper_trading::quotes::HttpPriceSource;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_trading=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env().expect("invalid configuration");

    let pool = persistence::create_pool_and_migrate(&settings.database_url)
        .await
        .expect("failed to connect to database");
    persistence::ensure_portfolio(
        &pool,
        &settings.default_portfolio_id,
        settings.default_cash_balance,
    )
    .await
    .expect("failed to seed default portfolio");
    info!(
        portfolio_id = %settings.default_portfolio_id,
        "database ready"
    );

    let app_state = AppState {
        db: pool,
        prices: Arc::new(HttpPriceSource::new(settings.quote_api_url.clone())),
        default_portfolio_id: settings.default_portfolio_id.clone(),
    };

    let app = app_router(app_state);
    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .expect("failed to bind listener");
    info!(addr = %settings.bind_addr, "listening");
    axum::serve(listener, app).await.unwrap();
}
