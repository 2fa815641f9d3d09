use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use talearc_api::config::AppConfig;
use talearc_api::database::{DatabaseManager, PgStore};
use talearc_api::services::ChapterContentStore;
use talearc_api::{router, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info,sqlx=warn")),
        )
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    tracing::info!("Starting TaleArc API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database).await?;
    let store = Arc::new(PgStore::new(pool));
    let content = Arc::new(
        ChapterContentStore::open(&config.storage.content_base_path)
            .await
            .context("opening chapter content directory")?,
    );

    let state = AppState::new(config.clone(), store, content)?;
    let _purge = state
        .blacklist()
        .spawn_purge_task(Duration::from_secs(config.security.token_blacklist_purge_secs.max(1)));

    let bind_addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!(
        "TaleArc API listening on http://{}{}",
        bind_addr,
        config.server.api_prefix
    );

    axum::serve(listener, router(state)).await?;
    Ok(())
}
