//! Profile storage.
//!
//! # Tables
//!
//! - `app_user` - Users issued by the auth provider (name is editable here)
//! - `social_account` - Linked social handles, unique per `(user_id, platform_id)`
//! - `profile_traits` - Onboarding answers, one row per user
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p heartline-cli -- migrate
//! ```
//!
//! Two backends implement [`ProfileRepository`]: [`PgProfileRepository`] for
//! production and [`MemoryProfileRepository`] for local runs and tests.

mod memory;
mod profiles;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use heartline_core::UserId;
use heartline_core::api::{ProfileTraits, UpsertOutcome};

use crate::models::{HandleUpsert, SocialAccount, User};

pub use memory::MemoryProfileRepository;
pub use profiles::PgProfileRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a second account for the same platform).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Storage operations needed by the profile service.
///
/// Every write takes `now` from the caller so that a composite update stamps
/// all of its rows with the same instant.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Get a user by id.
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Create a user.
    ///
    /// Returns `RepositoryError::Conflict` if the id is taken.
    async fn create_user(
        &self,
        id: &UserId,
        name: &str,
        email: Option<&str>,
    ) -> Result<User, RepositoryError>;

    /// Set the display name and bump `updated_at`.
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    async fn update_user_name(
        &self,
        id: &UserId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// All social accounts of a user, oldest first.
    async fn list_social_accounts(
        &self,
        id: &UserId,
    ) -> Result<Vec<SocialAccount>, RepositoryError>;

    /// Create or update the account for `upsert.platform`.
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    async fn upsert_social_account(
        &self,
        id: &UserId,
        upsert: &HandleUpsert,
        now: DateTime<Utc>,
    ) -> Result<UpsertOutcome, RepositoryError>;

    /// Rename the user and upsert every handle as one atomic unit.
    ///
    /// Either every write is applied or none is. Outcomes are returned in
    /// the order of `handles`.
    async fn apply_profile_update(
        &self,
        id: &UserId,
        name: &str,
        handles: &[HandleUpsert],
        now: DateTime<Utc>,
    ) -> Result<Vec<UpsertOutcome>, RepositoryError>;

    /// Stored onboarding answers, if any.
    async fn get_traits(&self, id: &UserId) -> Result<Option<ProfileTraits>, RepositoryError>;

    /// Replace the onboarding answers.
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    async fn save_traits(
        &self,
        id: &UserId,
        traits: &ProfileTraits,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}
