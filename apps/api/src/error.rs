use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use ts_rs::TS;

use itinero_core::AppError;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    pub success: bool,
    /// Human-readable message, safe to render directly.
    pub error: String,
    /// Stable machine-readable code for programmatic handling.
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            success: false,
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, payload) = match self.0 {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("invalid request data", "VALIDATION_ERROR")
                    .with_details(message),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                ErrorResponse::new(message, "AUTH_REQUIRED"),
            ),
            AppError::Generation(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(
                    "unable to generate the itinerary, please retry in a few minutes",
                    "GENERATION_FAILED",
                )
                .with_details(message),
            ),
            // Internal diagnostics stay in the logs, not in responses.
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("an unexpected error occurred", "INTERNAL_ERROR"),
            ),
        };

        (status, Json(payload)).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
