mod config;
mod db;
mod error;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::config::{AppConfig, StoreBackend};
use crate::error::ErrorCode;
use crate::services::memory_store::MemoryPageStore;
use crate::services::page_store::PageStore;
use crate::services::pages::PageService;
use crate::services::pg_store::PgPageStore;
use crate::services::renumber::RenumberStrategy;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            return Err(err.into());
        }
    }
    tracing_subscriber::fmt::init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(code = err.error_code(), error = %err, "invalid configuration");
            return Err(err.into());
        }
    };

    let store: Arc<dyn PageStore> = match &config.store {
        StoreBackend::Postgres { database_url, max_connections } => {
            let pool = db::init_pool(database_url, *max_connections).await?;
            tracing::info!(max_connections, "postgres page store ready");
            Arc::new(PgPageStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory page store; pages are lost on restart");
            Arc::new(MemoryPageStore::new())
        }
    };

    let strategy = RenumberStrategy::new(config.renumber_fallback);
    let state = state::AppState::new(PageService::new(store, strategy, config.page_op_timeout));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(
        port = config.port,
        fallback = config.renumber_fallback,
        timeout_ms = config.page_op_timeout.as_millis(),
        "mangaka listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
