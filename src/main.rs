use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use product_files::app::{app, with_global_layers, AppState};
use product_files::is_production;
use product_files::store::{Fixture, MemoryStore, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so SECURITY_JWT_SECRET, STORE_SEED_PATH, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = product_files::config::config();
    tracing::info!("Starting product files service in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        if is_production!() {
            anyhow::bail!("SECURITY_JWT_SECRET must be set in production");
        }
        tracing::warn!("SECURITY_JWT_SECRET is empty; every bearer token will be rejected");
    }

    let store: Arc<dyn RecordStore> = match &config.store.seed_path {
        Some(path) => {
            tracing::info!("Seeding store from {}", path);
            let fixture = Fixture::from_file(path).with_context(|| format!("failed to read fixture {}", path))?;
            Arc::new(fixture.into_store().await.context("failed to load fixture")?)
        }
        None => Arc::new(MemoryStore::new()),
    };

    let state = AppState::from_config(store, config);
    let router = with_global_layers(app(state), config);

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Product files service listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
