/**
 * API Error Types
 *
 * This module defines the error taxonomy used by every handler in the
 * application. Domain code raises a typed `ApiError` carrying an HTTP
 * status and message; a single `IntoResponse` implementation (see
 * `conversion`) renders it into the response envelope.
 *
 * # Error Categories
 *
 * - `Validation` - bad or missing input (400)
 * - `NotFound` - missing entity (404)
 * - `Unauthorized` - missing/invalid/expired credential, or a session made
 *   stale by a password change (401)
 * - `Forbidden` - authenticated but the role is not permitted (403)
 * - `Conflict` - uniqueness violation (409)
 * - `InvalidOrExpired` - bad or expired password-reset token (400)
 * - `DeliveryFailed` - outbound email/payment dispatch failure (502)
 * - `Database` / `Internal` - unexpected failures (500)
 */

use axum::http::StatusCode;
use thiserror::Error;

/// Application error type
///
/// Each variant maps to an HTTP status via `status_code()`. Database errors
/// are wrapped rather than stringified so the unique-violation → Conflict
/// mapping can inspect the driver error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad or missing input
    #[error("{message}")]
    Validation { message: String },

    /// Entity not found
    #[error("{message}")]
    NotFound { message: String },

    /// Missing, invalid, or stale credential
    #[error("{message}")]
    Unauthorized { message: String },

    /// Authenticated subject lacks the required role
    #[error("{message}")]
    Forbidden { message: String },

    /// Uniqueness violation raised at the application level
    #[error("{message}")]
    Conflict { message: String },

    /// Password-reset token is unknown or past its expiry
    #[error("Token is invalid or has expired")]
    InvalidOrExpired,

    /// Outbound email or payment dispatch failed
    #[error("{message}")]
    DeliveryFailed { message: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unexpected internal failure
    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not-found error for a resource name, matching the wording
    /// used across the API ("No tour found with that ID")
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound {
            message: format!("No {resource} found with that ID"),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a forbidden error
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a delivery-failed error
    pub fn delivery_failed(message: impl Into<String>) -> Self {
        Self::DeliveryFailed {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Validation` / `InvalidOrExpired` - 400 Bad Request
    /// - `Unauthorized` - 401, `Forbidden` - 403, `NotFound` - 404
    /// - `Conflict` - 409
    /// - `DeliveryFailed` - 502 Bad Gateway
    /// - `Database` - 409 for unique violations, 404 for `RowNotFound`,
    ///   500 otherwise
    /// - `Internal` - 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::InvalidOrExpired => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::DeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
            Self::Database(err) => match err {
                sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
                sqlx::Error::Database(db) if db.is_unique_violation() => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the client-facing error message
    ///
    /// Unique violations get a stable message instead of the driver text;
    /// other database messages are only shown when internal detail exposure
    /// is enabled (see `conversion`).
    pub fn message(&self) -> String {
        match self {
            Self::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                "Duplicate field value, please use another value".to_string()
            }
            Self::Database(sqlx::Error::RowNotFound) => "Resource not found".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether this error is an unexpected server-side failure whose
    /// details should be hidden outside development mode
    pub fn is_internal(&self) -> bool {
        matches!(
            self.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY
        )
    }
}
