use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bank::{SchemaError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Registration not found")]
    NotFound,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Corrupt stored document: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Inconsistent list: {0}")]
    SchemaConsistency(#[from] SchemaError),

    #[error("Registration is closed")]
    RegistrationClosed,

    #[error("Misconfigured: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AppError::DuplicateEmail,
            StoreError::NotFound => AppError::NotFound,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::MalformedPayload { .. } => StatusCode::BAD_REQUEST,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::SchemaConsistency { .. } => StatusCode::BAD_REQUEST,
            AppError::RegistrationClosed => StatusCode::FORBIDDEN,
            AppError::Config { .. } | AppError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            AppError::Validation(errors) => json!({
                "message": "Validation failed",
                "errors": errors.messages(),
            }),
            AppError::Config { .. } | AppError::Store { .. } => {
                error!("{self}");
                json!({ "message": "Server error" })
            }
            other => json!({ "message": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
