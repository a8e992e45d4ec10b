use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{
    ApiConfig, AppState, StorageBackend,
    repositories::{MemoryStore, PgStore, Store},
};
use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting attendance service");

    let config = ApiConfig::load()?;

    let store: Arc<dyn Store> = match config.storage {
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; records are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let bind_addr = config.bind_addr.clone();
    let app = api::create_router(AppState::new(store, config));

    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Attendance service listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down attendance service");
        })
        .await?;

    Ok(())
}
