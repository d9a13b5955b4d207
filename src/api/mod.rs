//! API module - HTTP endpoints for the dataset and its statistics

mod error;
mod handlers;

pub use error::ApiError;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::data::DataStore;
use crate::stats::StatsService;

/// Shared state handed to every handler.
///
/// Both services are stateless over the backing file, so handlers need no
/// locking; each request independently reloads from disk.
#[derive(Clone)]
pub struct AppState {
    pub store: DataStore,
    pub stats: StatsService,
}

impl AppState {
    pub fn new(store: DataStore) -> Self {
        let stats = StatsService::new(store.clone());
        Self { store, stats }
    }
}

/// Creates the application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/statistics", get(handlers::get_statistics))
        .route("/api/data", get(handlers::get_data))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on an already-bound listener until the process exits.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, create_router(state)).await
}
