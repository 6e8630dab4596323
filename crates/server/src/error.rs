//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Every failure is rendered as `{"success": false, "error": "..."}`.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use heartline_core::api::ActionResponse;

use crate::db::RepositoryError;
use crate::services::ProfileError;

/// Which operation failed, used to pick the generic message for storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl Operation {
    const fn failure_message(self) -> &'static str {
        match self {
            Self::Read => "Failed to fetch profile",
            Self::Write => "Failed to update profile",
        }
    }
}

/// Application-level error type for the profile API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage operation failed.
    #[error("Storage error while {op:?}: {source}")]
    Storage {
        op: Operation,
        #[source]
        source: RepositoryError,
    },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Concurrent write hit a uniqueness constraint.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Map a service error for a read endpoint.
    #[must_use]
    pub fn read(err: ProfileError) -> Self {
        Self::from_profile(err, Operation::Read)
    }

    /// Map a service error for a write endpoint.
    #[must_use]
    pub fn write(err: ProfileError) -> Self {
        Self::from_profile(err, Operation::Write)
    }

    fn from_profile(err: ProfileError, op: Operation) -> Self {
        match err {
            ProfileError::Validation(msg) => Self::BadRequest(msg),
            ProfileError::NotFound => Self::NotFound("User not found".to_owned()),
            ProfileError::Storage(RepositoryError::Conflict(msg)) => Self::Conflict(msg),
            ProfileError::Storage(source) => Self::Storage { op, source },
        }
    }

    const fn status(&self) -> StatusCode {
        match self {
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Storage { .. }) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Storage { op, .. } => op.failure_message().to_owned(),
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Conflict(_) => "Profile was changed concurrently, please retry".to_owned(),
        };

        (self.status(), Json(ActionResponse::<()>::failure(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
