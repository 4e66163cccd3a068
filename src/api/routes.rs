//! Router construction

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors_enabled = state.settings.server.cors_enabled;

    let router = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/image/prompt", post(handlers::generate_prompt))
        .route("/api/image/generation", post(handlers::generate_image))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
