use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppResult;
use crate::state::AppState;

/// Response header telling a real translation apart from the rate-limit sentinel.
pub const TRANSLATION_STATUS_HEADER: &str = "x-translation-status";

#[derive(Debug, Clone, Deserialize)]
pub struct TranslateRequest {
    /// Target language, as free text (e.g. "French")
    pub language: String,
    pub text: String,
}

/// `POST /api/translate`
///
/// Returns the translated text as `text/plain`. When the provider quota is
/// exhausted the body is the rate-limit sentinel and the status header reads
/// `rate-limited`.
pub async fn translate_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> AppResult<Response> {
    debug!(
        language = %request.language,
        chars = request.text.chars().count(),
        "Translation requested"
    );

    let translation = state
        .translator
        .translate(&request.text, &request.language)
        .await?;

    let status = if translation.is_rate_limited() {
        "rate-limited"
    } else {
        "ok"
    };

    Ok((
        [(TRANSLATION_STATUS_HEADER, status)],
        translation.text().to_owned(),
    )
        .into_response())
}
