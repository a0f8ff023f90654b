use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Serialize;
use sqlx::error::ErrorKind;
use thiserror::Error;

/// Message returned for every infrastructure failure. Store error text stays in the logs.
pub const SERVER_ERROR_MESSAGE: &str = "Server error";

/// Message returned when the store rejects item data the request validation let through.
pub const INVALID_DATA_MESSAGE: &str = "Invalid item data";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Duplicate key: {0}")]
    DuplicateKey(String),

    #[error("Could not assign a unique code after {attempts} attempts")]
    ResolutionExhausted { attempts: u32 },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::DuplicateKey(_)
            | AppError::ResolutionExhausted { .. }
            | AppError::StoreUnavailable(_)
            | AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text safe to hand back to the client.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg) => msg.clone(),
            AppError::ResolutionExhausted { .. } => {
                "Could not assign a unique code, please retry".to_string()
            }
            AppError::DuplicateKey(_) | AppError::StoreUnavailable(_) | AppError::Database(_) => {
                SERVER_ERROR_MESSAGE.to_string()
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let kind = db_err.kind();
                if let ErrorKind::UniqueViolation = kind {
                    return AppError::DuplicateKey(
                        db_err.constraint().unwrap_or("unique constraint").to_string(),
                    );
                }

                let invalid = is_invalid_data(&kind, db_err.code().as_deref());
                if invalid {
                    tracing::warn!("Store rejected item data: {}", db_err.message());
                    return AppError::Validation(INVALID_DATA_MESSAGE.to_string());
                }
                AppError::Database(sqlx::Error::Database(db_err))
            }
            sqlx::Error::PoolTimedOut => {
                AppError::StoreUnavailable("timed out acquiring a connection".to_string())
            }
            sqlx::Error::PoolClosed => {
                AppError::StoreUnavailable("connection pool is closed".to_string())
            }
            sqlx::Error::Io(e) => AppError::StoreUnavailable(format!("I/O error: {}", e)),
            sqlx::Error::Tls(e) => AppError::StoreUnavailable(format!("TLS error: {}", e)),
            other => AppError::Database(other),
        }
    }
}

/// Constraint violations on row content, or SQLSTATE class 22 (data exception:
/// value too long, NUL in text, numeric out of range).
fn is_invalid_data(kind: &ErrorKind, code: Option<&str>) -> bool {
    matches!(kind, ErrorKind::NotNullViolation | ErrorKind::CheckViolation)
        || code.is_some_and(|c| c.starts_with("22"))
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::Validation(rejection.body_text())
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
