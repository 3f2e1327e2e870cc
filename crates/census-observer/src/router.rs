//! Axum router construction for the export API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware
//! enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router for the export server.
///
/// CORS is configured to allow any origin for development dashboards. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // REST API
        .route("/api/series", get(handlers::get_series))
        .route("/api/species", get(handlers::list_species))
        .route("/api/species/{name}", get(handlers::get_species))
        .route("/api/pellets", get(handlers::get_pellets))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
