//! Server crate for the ReelRecs recommendation service.
//!
//! - `RecommendationService`: engine + cache facade shared by every request
//! - `create_router`: the HTTP API over that service
//! - `serve`: load the dataset, bind, and run until Ctrl-C

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use service::RecommendationService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    /// Used when a request omits `count`
    pub default_count: usize,
}

impl AppState {
    pub fn new(service: Arc<RecommendationService>, default_count: usize) -> Self {
        Self {
            service,
            default_count,
        }
    }
}

/// Load the dataset and serve HTTP until interrupted
pub async fn serve(config: ServerConfig) -> Result<()> {
    let data_dir = config.data_dir.clone();
    let capacity = config.cache_capacity;
    let service =
        tokio::task::spawn_blocking(move || RecommendationService::load(&data_dir, capacity))
            .await
            .context("Dataset loading task panicked")??;

    let state = AppState::new(Arc::new(service), config.default_count);
    let app = create_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
