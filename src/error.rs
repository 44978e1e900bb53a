//! Error types for the book catalog server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Errors are answered as plain text, which is what the catalog client displays.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                e.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                msg
            }
            AppError::Unavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                msg
            }
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::BadRequest(msg) => {
                tracing::debug!(status = %status.as_u16(), "client error: {}", msg);
                msg
            }
        };

        (status, message).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
