//! Shared primitives for all Rust crates in Itinero.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across Itinero crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Caller is not authenticated or blocked by request policy.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Itinerary generation exhausted its attempts or was throttled upstream.
    /// Carries the last attempt's diagnostic message.
    #[error("generation failed: {0}")]
    Generation(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn validation_error_formats_message() {
        let error = AppError::Validation("days must be between 1 and 30".to_owned());
        assert_eq!(
            error.to_string(),
            "validation error: days must be between 1 and 30"
        );
    }

    #[test]
    fn generation_error_keeps_diagnostic() {
        let error = AppError::Generation("no JSON object found in response".to_owned());
        assert!(error.to_string().contains("no JSON object found"));
    }
}
