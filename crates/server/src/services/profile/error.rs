//! Profile service error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during profile operations.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// Input rejected before touching storage. The message is user-facing.
    #[error("{0}")]
    Validation(String),

    /// The user does not exist.
    #[error("User not found")]
    NotFound,

    /// Repository/database error.
    #[error("storage error: {0}")]
    Storage(RepositoryError),
}

impl ProfileError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<RepositoryError> for ProfileError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Storage(other),
        }
    }
}
