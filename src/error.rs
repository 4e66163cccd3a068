//! Common error types for the postcard gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::gateway::classifier::FailureKind;
use crate::gateway::orchestrator::Exhaustion;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Image generation capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("All image models are unavailable: {0}")]
    AllModelsUnavailable(String),

    #[error("Image generation failed: {0}")]
    GenerationFailed(String),
}

impl AppError {
    /// Machine-readable code carried in every error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::CapacityExceeded(_) => "CAPACITY_EXCEEDED",
            AppError::AllModelsUnavailable(_) => "ALL_MODELS_UNAVAILABLE",
            AppError::GenerationFailed(_) => "GENERATION_FAILED",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::CapacityExceeded(_) | AppError::AllModelsUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Exhaustion> for AppError {
    fn from(exhaustion: Exhaustion) -> Self {
        let reason = exhaustion.last_reason;
        match exhaustion.last_failure {
            FailureKind::Transient if exhaustion.attempted_backends.len() > 1 => {
                AppError::AllModelsUnavailable(reason)
            }
            FailureKind::Transient => AppError::CapacityExceeded(reason),
            FailureKind::Permanent => AppError::GenerationFailed(reason),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match status {
            StatusCode::BAD_REQUEST => "Bad request",
            StatusCode::SERVICE_UNAVAILABLE => "Service unavailable",
            _ => "Internal server error",
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            code: self.code().to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;
