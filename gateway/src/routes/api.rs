use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{api, translate};
use crate::state::AppState;
use std::sync::Arc;

/// Create the REST API router
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(api::health_check))
        .route("/api/translate", post(translate::translate_handler))
        .layer(TraceLayer::new_for_http())
}
