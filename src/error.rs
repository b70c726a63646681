//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
///
/// Every rejection carries a stable machine-readable code so callers can
/// render an actionable message without parsing prose.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    InvalidInput {
        code: &'static str,
        message: String,
    },

    #[error("authentication required")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{message}")]
    Conflict {
        code: &'static str,
        message: String,
    },

    /// A race or a bug: the transaction was aborted and nothing was applied.
    #[error("state violation: {0}")]
    StateViolation(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("payment gateway error: {0}")]
    Gateway(String),
}

impl AppError {
    pub fn invalid_input(code: &'static str, message: impl Into<String>) -> Self {
        AppError::InvalidInput {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        AppError::Conflict {
            code,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidInput { code, .. } => (StatusCode::BAD_REQUEST, *code),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Conflict { code, .. } => (StatusCode::CONFLICT, *code),
            AppError::StateViolation(msg) => {
                tracing::error!("state violation: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "STATE_VIOLATION")
            }
            AppError::Database(e) => {
                tracing::error!("database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
            AppError::Gateway(msg) => {
                tracing::error!("gateway error: {}", msg);
                (StatusCode::BAD_GATEWAY, "GATEWAY_ERROR")
            }
        };

        let body = ErrorBody {
            code: code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
