//! Client configuration.
//!
//! # Environment Variables
//!
//! - `HEARTLINE_API_URL` - Server base URL (default: <http://127.0.0.1:3000>)
//! - `HEARTLINE_DATA_DIR` - Directory for persisted local state (default: `.heartline`)
//! - `HEARTLINE_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ClientError;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_DATA_DIR: &str = ".heartline";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the profile server.
    pub api_url: Url,
    /// Where the local stores are persisted.
    pub data_dir: PathBuf,
    /// Upper bound for every network call.
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Configuration for `api_url` with default data dir and timeout.
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if a variable is invalid.
    pub fn from_env() -> Result<Self, ClientError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Config` if a variable is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let raw_url = get("HEARTLINE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = Url::parse(&raw_url)
            .map_err(|e| ClientError::Config(format!("HEARTLINE_API_URL: {e}")))?;

        let timeout_secs = match get("HEARTLINE_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ClientError::Config(format!("HEARTLINE_REQUEST_TIMEOUT_SECS: {e}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let data_dir = get("HEARTLINE_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_owned());

        Ok(Self::new(api_url)
            .with_data_dir(data_dir)
            .with_request_timeout(Duration::from_secs(timeout_secs)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.data_dir, PathBuf::from(".heartline"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(|key| match key {
            "HEARTLINE_API_URL" => Some("https://api.example.com/v1/".to_owned()),
            "HEARTLINE_REQUEST_TIMEOUT_SECS" => Some("3".to_owned()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.api_url.host_str(), Some("api.example.com"));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            ClientConfig::from_lookup(|key| (key == "HEARTLINE_API_URL").then(|| "not a url".to_owned())),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(|key| {
                (key == "HEARTLINE_REQUEST_TIMEOUT_SECS").then(|| "soon".to_owned())
            }),
            Err(ClientError::Config(_))
        ));
    }
}
