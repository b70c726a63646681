use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use solvista_booking::cache::AppCache;
use solvista_booking::config::Config;
use solvista_booking::gateway::{DisabledGateway, PaymentGateway, StripeGateway};
use solvista_booking::{app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("solvista_booking=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url).await?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    let gateway: Arc<dyn PaymentGateway> = match config.stripe_secret_key.clone() {
        Some(key) => {
            tracing::info!("payment gateway: stripe");
            Arc::new(StripeGateway::new(
                key,
                config.checkout_success_url.clone(),
                config.checkout_cancel_url.clone(),
            ))
        }
        None => {
            tracing::warn!("STRIPE_SECRET_KEY not set, payments disabled");
            Arc::new(DisabledGateway)
        }
    };

    let state = AppState {
        db: pool,
        cache: AppCache::new(),
        gateway,
    };

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", config.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
