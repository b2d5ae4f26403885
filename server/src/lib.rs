//! Webtrail Backend Server
//!
//! Log-storage collaborator for the Webtrail agent: accepts enriched
//! activity events on `/logVisit`, file blobs on `/uploadFile`, and serves
//! the full log back on `/getLogs`. Storage is a flat JSON-array file plus
//! an uploads directory.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod net;
pub mod state;
pub mod store;
pub mod ua;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};
pub use state::AppState;

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/logVisit", post(handlers::logs::log_visit))
        .route("/uploadFile", post(handlers::uploads::upload_file))
        .route("/getLogs", get(handlers::logs::get_logs))
        .route("/health", get(handlers::health::check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
