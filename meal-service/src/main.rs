use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use meal_service::config::load_service_config;
use meal_service::store::PgStore;
use meal_service::{router, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = load_service_config()?;
    info!(config = ?config, "Loaded configuration");

    let store = PgStore::connect(&config.database_url)
        .await
        .context("Failed to connect to the database")?;
    store
        .migrate()
        .await
        .context("Failed to apply database migrations")?;

    let ip: IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST value '{}'", config.host))?;
    let addr = SocketAddr::from((ip, config.port));

    let state = AppState::new(Arc::new(store), config)?;
    let app = router(state);

    info!(%addr, "starting meal-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
