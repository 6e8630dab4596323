//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::ProfileCache;
use crate::config::ServerConfig;
use crate::db::ProfileRepository;
use crate::services::ProfileService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the profile service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    profiles: ProfileService,
}

impl AppState {
    /// Create a new application state over `repo`.
    ///
    /// The profile cache is sized from `config`.
    #[must_use]
    pub fn new(config: ServerConfig, repo: Arc<dyn ProfileRepository>) -> Self {
        let cache = ProfileCache::new(config.profile_cache_capacity, config.profile_cache_ttl);
        let profiles = ProfileService::new(repo, cache);

        Self {
            inner: Arc::new(AppStateInner { config, profiles }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the profile service.
    #[must_use]
    pub fn profiles(&self) -> &ProfileService {
        &self.inner.profiles
    }
}
