use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes.
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthcheck))
        .route("/api/pods/:name", post(handlers::pods::process_fabric))
        .route("/api/pods/:name", get(handlers::pods::get_pod))
        .route("/api/pods/:name", delete(handlers::pods::delete_pod))
        .route("/api/pods/:name/devices", get(handlers::pods::list_devices))
        .route(
            "/api/pods/:name/devices/:device/config",
            get(handlers::pods::get_device_config),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
