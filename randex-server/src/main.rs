//! Randex Server - HTTP surface for verifiable random sampling
//!
//! Wires an in-memory delegate indexer into the sampling store and exposes
//! GET /ipni/v0/sample/{provider_id}/{context_id}. Production deployments
//! substitute their own [`randex_core::Indexer`] delegate.

use std::sync::Arc;

use randex_core::{Indexer, MemoryIndexer, SamplingStore};
use randex_server::{create_router_with_config, AppState, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let delegate = Arc::new(MemoryIndexer::new());
    let store = Arc::new(
        SamplingStore::new(config.store_path.clone(), delegate)
            .expect("failed to create sampling store"),
    );

    let state = AppState {
        store: store.clone(),
    };
    let app = create_router_with_config(state, &config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");
    tracing::info!(%addr, store_path = %config.store_path.display(), "randex listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server stopped unexpectedly");

    if let Err(e) = store.close().await {
        tracing::error!(error = %e, "failed to close sampling store");
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("shutdown signal received");
    }
}
