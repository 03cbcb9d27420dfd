//! Ledgerwise API Server
//!
//! Main entry point for the Ledgerwise accounting service.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ledgerwise_api::{AppState, HttpRateFeed, create_router};
use ledgerwise_db::{SeaOrmStore, connect_with, migration::Migrator};
use ledgerwise_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerwise=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect_with(&config.database).await?;
    Migrator::up(&db, None).await.context("Failed to apply migrations")?;
    info!("Migrations applied");

    let mut state = AppState::new(SeaOrmStore::new(db), config.matching.clone());
    match &config.rates.feed_url {
        Some(url) => {
            let feed = HttpRateFeed::new(url.clone(), Duration::from_secs(config.rates.timeout_secs))
                .context("Failed to build rate feed client")?;
            info!(feed_url = %url, "Live exchange rate feed configured");
            state = state.with_rate_feed(Arc::new(feed));
        }
        None => warn!("No exchange rate feed configured, refresh uses stored rates"),
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
