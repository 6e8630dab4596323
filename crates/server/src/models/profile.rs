//! Profile domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use heartline_core::api::{SocialHandle, UserRecord};
use heartline_core::{PlatformKey, SocialAccountId, UserId, Verification, VerificationStatus};

/// A user record (domain type).
///
/// Users are created by the auth provider; this service only updates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Identifier issued by the auth provider.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, owned by the auth provider.
    pub email: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserRecord {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// A linked social account (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialAccount {
    pub id: SocialAccountId,
    pub user_id: UserId,
    /// Canonical platform key, unique per user.
    pub platform: PlatformKey,
    /// Handle on the external platform.
    pub account_id: Option<String>,
    pub verification: Verification,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SocialAccount {
    /// Project onto the client-facing handle.
    #[must_use]
    pub fn into_handle(self) -> SocialHandle {
        SocialHandle::project(self.platform, self.account_id, self.verification)
    }
}

/// A validated request to create or update one social account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleUpsert {
    pub platform: PlatformKey,
    /// Trimmed, non-empty handle.
    pub account_id: String,
    pub status: VerificationStatus,
}

impl HandleUpsert {
    /// Verification state after applying this upsert to an account that is
    /// currently in `current`.
    #[must_use]
    pub const fn next_verification(&self, current: Verification, now: DateTime<Utc>) -> Verification {
        current.transition(self.status, now)
    }
}
