//! ParkEase Service - HTTP API for parking lot operators
//!
//! This is the main entry point for the parkease service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use parkease_core::BranchId;
use parkease_service::{create_router, seed_demo_data, AppState, ServiceConfig};
use parkease_store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,parkease=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ParkEase Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        auth_issuer = %config.auth_issuer,
        shared_secret_auth = %config.auth_shared_secret.is_some(),
        llm_configured = %config.llm_api_key.is_some(),
        default_rate = %config.default_tariff.price_per_hour,
        "Service configuration loaded"
    );

    let store = open_store(&config)?;

    if let Some(branch) = &config.seed_demo_branch {
        let branch_id: BranchId = branch.parse()?;
        seed_demo_data(store.as_ref(), &branch_id, chrono::Utc::now())?;
    }

    // Build app state
    let state = AppState::new(store, config.clone());

    // Create the router
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(feature = "rocksdb-backend")]
fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, parkease_store::StoreError> {
    tracing::info!(path = %config.data_dir, "Opening RocksDB store");
    Ok(Arc::new(parkease_store::RocksStore::open(&config.data_dir)?))
}

#[cfg(not(feature = "rocksdb-backend"))]
#[allow(clippy::unnecessary_wraps)]
fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, parkease_store::StoreError> {
    tracing::warn!(
        data_dir = %config.data_dir,
        "Built without rocksdb-backend - records are kept in memory only"
    );
    Ok(Arc::new(parkease_store::MemoryStore::new()))
}
