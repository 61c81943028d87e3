use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::owm::ProviderError;

/// Standard error response body.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No station found: {0}")]
    NoStation(String),

    #[error("Weather provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::NoStation(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Provider(err) => (provider_status(err), err.to_string()),
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal database error".to_string(),
                )
            }
        };

        (status, axum::Json(ErrorResponse { error: message })).into_response()
    }
}

/// HTTP status for each provider failure cause.
///
/// Rate limiting maps to 503 (retry later), a provider "no data for these
/// coordinates" maps to 404, malformed caller coordinates to 400, and
/// everything else (bad credential, transport, unexpected status) to 502.
fn provider_status(err: &ProviderError) -> StatusCode {
    match err {
        ProviderError::InvalidCoordinate(_) => StatusCode::BAD_REQUEST,
        ProviderError::NotFound => StatusCode::NOT_FOUND,
        ProviderError::RateLimited => StatusCode::SERVICE_UNAVAILABLE,
        ProviderError::Auth
        | ProviderError::Status(_)
        | ProviderError::Transport(_)
        | ProviderError::MalformedResponse(_) => StatusCode::BAD_GATEWAY,
    }
}
