//! Errors surfaced at the HTTP boundary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::llm::LLMError;
use crate::core::translate::TranslateError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Translation failed: {0}")]
    Translation(#[from] TranslateError),

    #[error("Provider setup failed: {0}")]
    Provider(#[from] LLMError),
}

pub type AppResult<T> = Result<T, AppError>;

/// Every fault maps to a generic 500. The cause is logged, never returned.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);

        let body = Json(json!({
            "error": {
                "message": "Internal server error",
                "type": "server_error",
            }
        }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_map_to_500_without_detail() {
        let err = AppError::Translation(TranslateError::Provider(LLMError::AuthenticationFailed(
            "secret detail".to_string(),
        )));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_display_includes_cause() {
        let err = AppError::from(TranslateError::EmptyResponse);
        assert_eq!(err.to_string(), "Translation failed: Reply contained no text");
    }
}
