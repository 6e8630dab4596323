//! Command implementations.

pub mod migrate;
pub mod profile;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use heartline_server::cache::ProfileCache;
use heartline_server::db::{ProfileRepository, RepositoryError, create_pool};
use heartline_server::services::{ProfileError, ProfileService};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Profile(#[from] ProfileError),

    /// Invalid command-line argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Connect to the database named by `HEARTLINE_DATABASE_URL`.
pub async fn connect() -> Result<PgPool, CommandError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("HEARTLINE_DATABASE_URL")
        .map_err(|_| CommandError::MissingEnvVar("HEARTLINE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    Ok(create_pool(&SecretString::from(database_url)).await?)
}

/// Profile service for a one-shot command. Its cache lives only as long as
/// the process.
pub fn profile_service(repo: Arc<dyn ProfileRepository>) -> ProfileService {
    ProfileService::new(repo, ProfileCache::new(1, Duration::from_secs(1)))
}
