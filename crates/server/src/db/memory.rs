//! In-memory profile repository for local runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use heartline_core::api::{ProfileTraits, UpsertOutcome};
use heartline_core::{SocialAccountId, UserId, Verification};

use super::{ProfileRepository, RepositoryError};
use crate::models::{HandleUpsert, SocialAccount, User};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    /// Accounts per user in insertion order.
    accounts: HashMap<UserId, Vec<SocialAccount>>,
    traits: HashMap<UserId, ProfileTraits>,
}

impl Tables {
    fn user_mut(&mut self, id: &UserId) -> Result<&mut User, RepositoryError> {
        self.users.get_mut(id).ok_or(RepositoryError::NotFound)
    }

    fn upsert(&mut self, id: &UserId, upsert: &HandleUpsert, now: DateTime<Utc>) -> UpsertOutcome {
        let accounts = self.accounts.entry(id.clone()).or_default();

        if let Some(account) = accounts.iter_mut().find(|a| a.platform == upsert.platform) {
            account.account_id = Some(upsert.account_id.clone());
            account.verification = upsert.next_verification(account.verification, now);
            account.updated_at = now;
            return UpsertOutcome::Updated;
        }

        accounts.push(SocialAccount {
            id: SocialAccountId::generate(),
            user_id: id.clone(),
            platform: upsert.platform.clone(),
            account_id: Some(upsert.account_id.clone()),
            verification: upsert.next_verification(Verification::Unverified, now),
            created_at: now,
            updated_at: now,
        });
        UpsertOutcome::Created
    }
}

/// Repository that keeps everything in process memory.
///
/// All writes for a call happen under one write lock, so composite updates
/// are atomic with respect to other callers.
#[derive(Default)]
pub struct MemoryProfileRepository {
    tables: RwLock<Tables>,
}

impl MemoryProfileRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileRepository {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn create_user(
        &self,
        id: &UserId,
        name: &str,
        email: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(id) {
            return Err(RepositoryError::Conflict("user already exists".to_owned()));
        }

        let now = Utc::now();
        let user = User {
            id: id.clone(),
            name: name.to_owned(),
            email: email.map(str::to_owned),
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id.clone(), user.clone());
        Ok(user)
    }

    async fn update_user_name(
        &self,
        id: &UserId,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = tables.user_mut(id)?;
        name.clone_into(&mut user.name);
        user.updated_at = now;
        Ok(())
    }

    async fn list_social_accounts(
        &self,
        id: &UserId,
    ) -> Result<Vec<SocialAccount>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .await
            .accounts
            .get(id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upsert_social_account(
        &self,
        id: &UserId,
        upsert: &HandleUpsert,
        now: DateTime<Utc>,
    ) -> Result<UpsertOutcome, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.user_mut(id)?;
        Ok(tables.upsert(id, upsert, now))
    }

    async fn apply_profile_update(
        &self,
        id: &UserId,
        name: &str,
        handles: &[HandleUpsert],
        now: DateTime<Utc>,
    ) -> Result<Vec<UpsertOutcome>, RepositoryError> {
        let mut tables = self.tables.write().await;
        let user = tables.user_mut(id)?;
        name.clone_into(&mut user.name);
        user.updated_at = now;

        Ok(handles
            .iter()
            .map(|upsert| tables.upsert(id, upsert, now))
            .collect())
    }

    async fn get_traits(&self, id: &UserId) -> Result<Option<ProfileTraits>, RepositoryError> {
        Ok(self.tables.read().await.traits.get(id).cloned())
    }

    async fn save_traits(
        &self,
        id: &UserId,
        traits: &ProfileTraits,
        _now: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.user_mut(id)?;
        tables.traits.insert(id.clone(), traits.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use heartline_core::{PlatformKey, VerificationStatus};

    use super::*;

    fn upsert(platform: &str, username: &str, status: VerificationStatus) -> HandleUpsert {
        HandleUpsert {
            platform: PlatformKey::parse(platform).unwrap(),
            account_id: username.to_owned(),
            status,
        }
    }

    async fn repo_with_alice() -> (MemoryProfileRepository, UserId) {
        let repo = MemoryProfileRepository::new();
        let alice = UserId::parse("alice").unwrap();
        repo.create_user(&alice, "Alice", None).await.unwrap();
        (repo, alice)
    }

    #[tokio::test]
    async fn test_upsert_twice_keeps_one_record() {
        let (repo, alice) = repo_with_alice().await;
        let now = Utc::now();

        let first = repo
            .upsert_social_account(&alice, &upsert("Twitter", "alice_w", VerificationStatus::Unverified), now)
            .await
            .unwrap();
        let second = repo
            .upsert_social_account(&alice, &upsert("twitter", "alice_x", VerificationStatus::Verified), now)
            .await
            .unwrap();

        assert_eq!(first, UpsertOutcome::Created);
        assert_eq!(second, UpsertOutcome::Updated);

        let accounts = repo.list_social_accounts(&alice).await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].account_id.as_deref(), Some("alice_x"));
        assert!(accounts[0].verification.is_verified());
    }

    #[tokio::test]
    async fn test_upsert_unknown_user() {
        let repo = MemoryProfileRepository::new();
        let ghost = UserId::parse("ghost").unwrap();
        let err = repo
            .upsert_social_account(&ghost, &upsert("email", "g@example.com", VerificationStatus::Unverified), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
        assert!(repo.list_social_accounts(&ghost).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_user_conflict() {
        let (repo, alice) = repo_with_alice().await;
        let err = repo.create_user(&alice, "Other", None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_apply_profile_update_unknown_user_writes_nothing() {
        let repo = MemoryProfileRepository::new();
        let ghost = UserId::parse("ghost").unwrap();
        let result = repo
            .apply_profile_update(
                &ghost,
                "Ghost",
                &[upsert("telegram", "boo", VerificationStatus::Unverified)],
                Utc::now(),
            )
            .await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert!(repo.list_social_accounts(&ghost).await.unwrap().is_empty());
    }
}
