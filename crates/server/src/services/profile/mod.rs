//! Profile service.
//!
//! Validates input, drives the repository and keeps the profile view cache
//! coherent: every successful write invalidates the cached view of the user.

mod error;

pub use error::ProfileError;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use heartline_core::api::{
    HandleOutcome, ProfileTraits, ProfileView, SocialHandleInput, UpdateProfileRequest,
    UpdateProfileResult, UpsertOutcome, UserRecord,
};
use heartline_core::{PlatformKey, UserId, UserIdError, VerificationStatus};

use crate::cache::ProfileCache;
use crate::db::ProfileRepository;
use crate::models::HandleUpsert;

const MISSING_FIELDS: &str = "Missing required fields";

/// Profile service.
///
/// Cheap to clone; the repository and cache are shared.
#[derive(Clone)]
pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
    cache: ProfileCache,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub fn new(repo: Arc<dyn ProfileRepository>, cache: ProfileCache) -> Self {
        Self { repo, cache }
    }

    /// Get a reference to the repository.
    #[must_use]
    pub fn repository(&self) -> &dyn ProfileRepository {
        self.repo.as_ref()
    }

    /// Load a user with their social handles and onboarding traits.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` if the user id is empty.
    /// Returns `ProfileError::NotFound` if no such user exists.
    /// Returns `ProfileError::Storage` if the repository fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: &str) -> Result<ProfileView, ProfileError> {
        let id = UserId::parse(user_id).map_err(|e| match e {
            UserIdError::Empty => ProfileError::validation("User ID is required"),
            other => ProfileError::validation(other.to_string()),
        })?;

        if let Some(view) = self.cache.get(&id).await {
            debug!("Cache hit for profile");
            return Ok(view);
        }

        let ticket = self.cache.ticket().await;
        let user = self.repo.get_user(&id).await?.ok_or(ProfileError::NotFound)?;
        let social_handles = self
            .repo
            .list_social_accounts(&id)
            .await?
            .into_iter()
            .map(crate::models::SocialAccount::into_handle)
            .collect();
        let traits = self.repo.get_traits(&id).await?;

        let view = ProfileView {
            user: UserRecord::from(user),
            social_handles,
            traits,
        };
        if !self.cache.fill(ticket, id, view.clone()).await {
            debug!("Profile changed during read, not caching");
        }
        Ok(view)
    }

    /// Change a user's display name.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` if the user id or name is empty.
    /// Returns `ProfileError::NotFound` if no such user exists.
    /// Returns `ProfileError::Storage` if the repository fails.
    #[instrument(skip(self, name))]
    pub async fn update_name(&self, user_id: &str, name: &str) -> Result<(), ProfileError> {
        let (id, name) = required_fields(user_id, name)?;

        self.repo.update_user_name(&id, name, Utc::now()).await?;
        self.cache.invalidate(&id).await;

        info!(user_id = %id, "profile.updated");
        Ok(())
    }

    /// Create or update the user's account on one platform.
    ///
    /// An empty username is skipped without touching storage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` if the user id or platform is empty.
    /// Returns `ProfileError::NotFound` if no such user exists.
    /// Returns `ProfileError::Storage` if the repository fails.
    #[instrument(skip(self, username))]
    pub async fn upsert_social_account(
        &self,
        user_id: &str,
        platform: &str,
        username: &str,
        status: VerificationStatus,
    ) -> Result<UpsertOutcome, ProfileError> {
        let id = UserId::parse(user_id).map_err(|_| ProfileError::validation(MISSING_FIELDS))?;

        let Some(upsert) = plan_upsert(platform, username, status)? else {
            debug!("Empty username, skipping");
            return Ok(UpsertOutcome::Skipped);
        };

        let outcome = self
            .repo
            .upsert_social_account(&id, &upsert, Utc::now())
            .await?;
        self.cache.invalidate(&id).await;

        info!(user_id = %id, platform = %upsert.platform, ?outcome, "social_account.upserted");
        Ok(outcome)
    }

    /// Rename the user and upsert all submitted handles in one atomic write.
    ///
    /// Handles with an empty username are reported as skipped. Outcomes are
    /// returned in request order.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` if the user id or name is empty, or
    /// a handle with a username has no platform. Nothing is written then.
    /// Returns `ProfileError::NotFound` if no such user exists.
    /// Returns `ProfileError::Storage` if the repository fails; no write from
    /// this call is kept.
    #[instrument(skip(self, request), fields(handles = request.social_handles.len()))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<UpdateProfileResult, ProfileError> {
        let (id, name) = required_fields(user_id, &request.name)?;

        let planned = request
            .social_handles
            .iter()
            .map(|handle| {
                plan_upsert(&handle.platform, &handle.username, handle.requested_status())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let upserts: Vec<HandleUpsert> = planned.iter().flatten().cloned().collect();

        let mut applied = self
            .repo
            .apply_profile_update(&id, name, &upserts, Utc::now())
            .await?
            .into_iter();
        self.cache.invalidate(&id).await;

        let handles = request
            .social_handles
            .iter()
            .zip(&planned)
            .map(|(input, plan)| HandleOutcome {
                platform: outcome_platform(input, plan.as_ref()),
                outcome: if plan.is_some() {
                    applied.next().unwrap_or(UpsertOutcome::Skipped)
                } else {
                    UpsertOutcome::Skipped
                },
            })
            .collect();

        info!(user_id = %id, written = upserts.len(), "profile.updated");
        Ok(UpdateProfileResult { handles })
    }

    /// Replace the user's onboarding answers.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::Validation` if the user id is empty.
    /// Returns `ProfileError::NotFound` if no such user exists.
    /// Returns `ProfileError::Storage` if the repository fails.
    #[instrument(skip(self, traits))]
    pub async fn save_traits(
        &self,
        user_id: &str,
        traits: &ProfileTraits,
    ) -> Result<(), ProfileError> {
        let id = UserId::parse(user_id).map_err(|_| ProfileError::validation(MISSING_FIELDS))?;

        self.repo.save_traits(&id, traits, Utc::now()).await?;
        self.cache.invalidate(&id).await;

        info!(
            user_id = %id,
            selected = traits.selected_traits.len(),
            wanted = traits.wanted_traits.len(),
            "profile.traits_saved"
        );
        Ok(())
    }
}

/// Parse the user id and trim the name, rejecting either when empty.
fn required_fields<'a>(user_id: &str, name: &'a str) -> Result<(UserId, &'a str), ProfileError> {
    let name = name.trim();
    match UserId::parse(user_id) {
        Ok(id) if !name.is_empty() => Ok((id, name)),
        _ => Err(ProfileError::validation(MISSING_FIELDS)),
    }
}

/// Turn raw handle input into a repository upsert.
///
/// Returns `Ok(None)` for an empty username, which is skipped regardless of
/// the platform.
fn plan_upsert(
    platform: &str,
    username: &str,
    status: VerificationStatus,
) -> Result<Option<HandleUpsert>, ProfileError> {
    let username = username.trim();
    if username.is_empty() {
        return Ok(None);
    }

    let platform = PlatformKey::parse(platform)
        .map_err(|e| ProfileError::validation(format!("Invalid platform: {e}")))?;

    Ok(Some(HandleUpsert {
        platform,
        account_id: username.to_owned(),
        status,
    }))
}

fn outcome_platform(input: &SocialHandleInput, plan: Option<&HandleUpsert>) -> String {
    plan.map_or_else(
        || input.platform.trim().to_lowercase(),
        |upsert| upsert.platform.to_string(),
    )
}
