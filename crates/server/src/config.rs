//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HEARTLINE_DATABASE_URL` - `PostgreSQL` connection string
//!   (falls back to `DATABASE_URL`; not needed with `HEARTLINE_STORAGE=memory`)
//!
//! ## Optional
//! - `HEARTLINE_STORAGE` - `postgres` (default) or `memory`
//! - `HEARTLINE_SEED_USERS` - `id:Name` pairs separated by commas, created at
//!   startup in memory mode
//! - `HEARTLINE_HOST` - Bind address (default: 127.0.0.1)
//! - `HEARTLINE_PORT` - Listen port (default: 3000)
//! - `HEARTLINE_PROFILE_CACHE_TTL_SECS` - Profile view cache TTL (default: 300)
//! - `HEARTLINE_PROFILE_CACHE_CAPACITY` - Max cached profiles (default: 10000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where profiles are stored.
#[derive(Debug, Clone)]
pub enum StorageBackend {
    /// `PostgreSQL` (connection URL contains the password).
    Postgres { database_url: SecretString },
    /// Process-local storage, lost on restart. For local development.
    Memory { seed_users: Vec<SeedUser> },
}

/// A user created at startup when running with in-memory storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedUser {
    pub id: String,
    pub name: String,
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Profile storage backend
    pub storage: StorageBackend,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// How long a profile view stays cached
    pub profile_cache_ttl: Duration,
    /// Maximum number of cached profile views
    pub profile_cache_capacity: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of requests traced in Sentry
    pub sentry_traces_sample_rate: f32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let storage = match env.or_default("HEARTLINE_STORAGE", "postgres").as_str() {
            "postgres" => StorageBackend::Postgres {
                database_url: env.database_url("HEARTLINE_DATABASE_URL")?,
            },
            "memory" => StorageBackend::Memory {
                seed_users: parse_seed_users(
                    &env.optional("HEARTLINE_SEED_USERS").unwrap_or_default(),
                )?,
            },
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "HEARTLINE_STORAGE".to_string(),
                    format!("expected 'postgres' or 'memory', got '{other}'"),
                ));
            }
        };

        let host = env.parsed::<IpAddr>("HEARTLINE_HOST", "127.0.0.1")?;
        let port = env.parsed::<u16>("HEARTLINE_PORT", "3000")?;
        let ttl_secs = env.parsed::<u64>("HEARTLINE_PROFILE_CACHE_TTL_SECS", "300")?;
        let profile_cache_capacity = env.parsed::<u64>("HEARTLINE_PROFILE_CACHE_CAPACITY", "10000")?;

        Ok(Self {
            storage,
            host,
            port,
            profile_cache_ttl: Duration::from_secs(ttl_secs),
            profile_cache_capacity,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parsed::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: env.parsed::<f32>("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Configuration for tests and local runs: in-memory storage, no Sentry.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            storage: StorageBackend::Memory {
                seed_users: Vec::new(),
            },
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            profile_cache_ttl: Duration::from_secs(300),
            profile_cache_capacity: 10_000,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating empty values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, using `default` when it is unset.
    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Get database URL with fallback to generic `DATABASE_URL`.
    fn database_url(&self, primary_key: &str) -> Result<SecretString, ConfigError> {
        self.optional(primary_key)
            .or_else(|| self.optional("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar(primary_key.to_string()))
    }
}

/// Parse `id:Name,id2:Name Two` into seed users.
fn parse_seed_users(raw: &str) -> Result<Vec<SeedUser>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (id, name) = entry.split_once(':').ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "HEARTLINE_SEED_USERS".to_string(),
                    format!("expected 'id:Name', got '{entry}'"),
                )
            })?;
            Ok(SeedUser {
                id: id.trim().to_string(),
                name: name.trim().to_string(),
            })
        })
        .collect()
}
