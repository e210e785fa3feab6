use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bimbara_web::booking::PgBookingStore;
use bimbara_web::config::Config;
use bimbara_web::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bimbara_web=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env()?;
    let addr = config.bind_addr()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    info!("Connected to database");

    let store = Arc::new(PgBookingStore::new(pool));
    let state = AppState::new(store, Arc::new(config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
