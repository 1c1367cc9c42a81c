//! HTTP error handling and response conversion.
//!
//! Every failure leaves a handler as an [`AppError`], which picks the status
//! code from a fixed table and renders `{"error": <message>}`. Storage details
//! are logged but never sent to clients.

use crate::domain::quote::errors::DomainError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Application-level errors returned from handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found (404).
    NotFound(String),

    /// Malformed request (400).
    BadRequest(String),

    /// Request data failed validation (400).
    ValidationError(String),

    /// The caller already liked this quote (400).
    AlreadyLiked,

    /// Database operation failed (500).
    Database(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::AlreadyLiked => write!(f, "Already liked"),
            Self::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::ValidationError(_) | Self::AlreadyLiked => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients.
    fn user_message(&self) -> String {
        match self {
            Self::NotFound(msg) => msg.clone(),
            Self::BadRequest(msg) => msg.clone(),
            Self::ValidationError(msg) => msg.clone(),
            Self::AlreadyLiked => "You have already liked this quote".into(),
            Self::Database(_) => "Database operation failed".into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.user_message();

        if status.is_server_error() {
            tracing::error!("error={}", self);
        } else {
            tracing::warn!("error={}", self);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => AppError::NotFound(msg),
            DomainError::AlreadyLiked => AppError::AlreadyLiked,
            DomainError::ValidationError(msg) => AppError::ValidationError(msg),
            DomainError::Storage(msg) => AppError::Database(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}
