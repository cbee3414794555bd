use std::any::Any;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::domain::errors::{GenerationError, ValidationError};

const INTERNAL_ERROR_DETAIL: &str = "internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upstream(#[from] GenerationError),
    #[error("{0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        AppError::Unexpected(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text returned to the caller. Unexpected failures are not echoed.
    pub fn detail(&self) -> String {
        match self {
            AppError::Validation(err) => err.to_string(),
            AppError::Upstream(err) => format!("comic generation failed: {err}"),
            AppError::Unexpected(_) => INTERNAL_ERROR_DETAIL.to_string(),
        }
    }
}

/// JSON error body shared by the server and the CLI client.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(AppError::Validation(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            AppError::Validation(err) => info!(error = %err, "rejected comic request"),
            AppError::Upstream(err) => error!(error = %err, "image provider failure"),
            AppError::Unexpected(message) => error!(error = %message, "unexpected error"),
        }

        let body = ErrorResponse {
            detail: self.0.detail(),
        };
        (self.0.status(), Json(body)).into_response()
    }
}

/// Response for a handler that panicked: logged, then reported as a generic 500.
pub(crate) fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::from(AppError::unexpected(format!("handler panicked: {message}"))).into_response()
}
