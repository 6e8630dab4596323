//! Read-through cache of profile views.
//!
//! Entries expire after the configured TTL and are invalidated after every
//! successful write for the same user.
//!
//! Fills are tied to the invalidation generation observed before the read
//! started: a view loaded before a write committed is never stored after
//! that write's invalidation.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::RwLock;

use heartline_core::UserId;
use heartline_core::api::ProfileView;

/// Cache of `getProfile` results keyed by user.
#[derive(Clone)]
pub struct ProfileCache {
    inner: Cache<UserId, ProfileView>,
    generation: Arc<RwLock<u64>>,
}

/// Invalidation generation observed before loading a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTicket(u64);

impl ProfileCache {
    /// Create a cache holding at most `capacity` views for `ttl` each.
    #[must_use]
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
            generation: Arc::new(RwLock::new(0)),
        }
    }

    pub async fn get(&self, user_id: &UserId) -> Option<ProfileView> {
        self.inner.get(user_id).await
    }

    /// Take a ticket before reading from storage.
    pub async fn ticket(&self) -> FillTicket {
        FillTicket(*self.generation.read().await)
    }

    /// Store a view loaded under `ticket`.
    ///
    /// Skipped if any invalidation happened since the ticket was taken.
    /// Returns whether the view was stored.
    pub async fn fill(&self, ticket: FillTicket, user_id: UserId, view: ProfileView) -> bool {
        let generation = self.generation.read().await;
        if *generation != ticket.0 {
            return false;
        }
        self.inner.insert(user_id, view).await;
        true
    }

    /// Drop the cached view for a user.
    ///
    /// Waits for in-flight fills, so none can land after this returns.
    pub async fn invalidate(&self, user_id: &UserId) {
        let mut generation = self.generation.write().await;
        *generation = generation.wrapping_add(1);
        self.inner.invalidate(user_id).await;
    }
}
