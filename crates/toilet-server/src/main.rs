mod config;

use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use toilet_api::{AppStateInner, Authenticator, ToiletService};
use toilet_db::{CredentialStore, Database, MemoryStore};

use crate::config::{Config, StoreKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toilet=debug,toilet_api=debug,toilet_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!("Starting with {:?}", config);

    // Backend is chosen here; everything downstream sees only the trait.
    let store: Arc<dyn CredentialStore> = match config.store {
        StoreKind::Sqlite => Arc::new(Database::open(&config.db_path)?),
        StoreKind::Memory => {
            warn!("Using the in-memory store; all data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let authenticator = Arc::new(Authenticator::new(&config.jwt_secret, config.hash_cost)?);
    let service = ToiletService::new(store, authenticator.clone());
    let state = AppStateInner::new(service, authenticator);

    let app = toilet_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    info!("Toilet map server listening on {}", config.addr);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
