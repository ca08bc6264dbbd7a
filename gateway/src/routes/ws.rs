use axum::{Router, routing::get};
use std::sync::Arc;

use crate::handlers::transcription::transcription_handler;
use crate::state::AppState;

/// Create the WebSocket router for the transcription relay
pub fn create_ws_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/deepgram", get(transcription_handler))
}
