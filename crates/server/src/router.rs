//! HTTP router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/image/post", post(api::post_image))
        .route("/images/post", post(api::post_images))
        .route("/image/{id}", get(api::get_image))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
