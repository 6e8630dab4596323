//! Session-scoped profile editing.
//!
//! A [`ProfileSession`] is created when a user signs in and dropped through
//! [`ProfileSession::logout`]. It owns the committed profile, an optional
//! edit draft, and the two persisted local stores.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use heartline_core::api::UpdateProfileResult;
use heartline_core::{Gender, Trait, UserId};

use crate::draft::{PROFILE_STORE_KEY, ProfileDraft, SOCIAL_HANDLES_STORE_KEY};
use crate::error::ClientError;
use crate::gateway::ProfileGateway;
use crate::storage::DraftStorage;

/// Whether the profile screen is showing committed data or editing a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Viewing,
    Editing,
}

/// Profile state for one signed-in user.
pub struct ProfileSession {
    user_id: UserId,
    gateway: Arc<dyn ProfileGateway>,
    storage: Arc<dyn DraftStorage>,
    committed: ProfileDraft,
    draft: Option<ProfileDraft>,
    last_error: Option<String>,
}

impl std::fmt::Debug for ProfileSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileSession")
            .field("user_id", &self.user_id)
            .field("mode", &self.mode())
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

impl ProfileSession {
    /// Start a session for `user_id`. Call [`Self::load`] before showing it.
    #[must_use]
    pub fn new(
        user_id: UserId,
        gateway: Arc<dyn ProfileGateway>,
        storage: Arc<dyn DraftStorage>,
    ) -> Self {
        Self {
            user_id,
            gateway,
            storage,
            committed: ProfileDraft::default(),
            draft: None,
            last_error: None,
        }
    }

    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        if self.draft.is_some() {
            Mode::Editing
        } else {
            Mode::Viewing
        }
    }

    /// The last server-confirmed profile.
    #[must_use]
    pub const fn committed(&self) -> &ProfileDraft {
        &self.committed
    }

    /// The edit draft, if editing.
    #[must_use]
    pub const fn draft(&self) -> Option<&ProfileDraft> {
        self.draft.as_ref()
    }

    /// Message of the last failed load or save, cleared by a successful save.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Rehydrate the local stores, then merge in the server profile.
    ///
    /// If the server cannot be reached the rehydrated local copy stays
    /// committed and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails or the profile fetch fails.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn load(&mut self) -> Result<&ProfileDraft, ClientError> {
        self.committed = ProfileDraft::rehydrate(self.storage.as_ref()).await?;

        match self.gateway.fetch_profile(&self.user_id).await {
            Ok(view) => {
                self.committed.merge_server(view);
                self.committed.persist(self.storage.as_ref()).await?;
                self.last_error = None;
                Ok(&self.committed)
            }
            Err(e) => {
                warn!(error = %e, "Profile fetch failed, showing local copy");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Enter edit mode with a copy of the committed profile.
    ///
    /// Already editing: returns the existing draft untouched.
    pub fn begin_edit(&mut self) -> &mut ProfileDraft {
        self.draft.get_or_insert_with(|| self.committed.clone())
    }

    /// The edit draft.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidState` when not editing.
    pub fn draft_mut(&mut self) -> Result<&mut ProfileDraft, ClientError> {
        self.draft
            .as_mut()
            .ok_or(ClientError::InvalidState("not editing"))
    }

    /// Discard the draft and return to viewing.
    pub fn cancel(&mut self) {
        if self.draft.take().is_some() {
            info!(user_id = %self.user_id, "Discarded profile draft");
        }
    }

    /// Send the draft to the server and commit it.
    ///
    /// Name and handles go first, then age, gender and traits. If a request
    /// fails the session stays in edit mode with the draft unchanged. If only
    /// the local write fails the draft is committed, the session returns to
    /// viewing and the error is kept in [`Self::last_error`].
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidState` when not editing, or the error
    /// from the failed request or local write.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn save(&mut self) -> Result<UpdateProfileResult, ClientError> {
        let draft = self
            .draft
            .as_ref()
            .ok_or(ClientError::InvalidState("not editing"))?;

        let result = match self.push(draft).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Profile save failed, keeping draft");
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        // The server has the draft now, so it is committed even if the local
        // copy cannot be written.
        if let Some(draft) = self.draft.take() {
            self.committed = draft;
        }
        info!(handles = result.handles.len(), "Profile saved");

        if let Err(e) = self.committed.persist(self.storage.as_ref()).await {
            warn!(error = %e, "Profile saved but local copy not written");
            self.last_error = Some(e.to_string());
            return Err(e);
        }
        self.last_error = None;
        Ok(result)
    }

    async fn push(&self, draft: &ProfileDraft) -> Result<UpdateProfileResult, ClientError> {
        let result = self
            .gateway
            .update_profile(&self.user_id, &draft.to_update_request())
            .await?;
        self.gateway
            .save_traits(&self.user_id, &draft.to_traits())
            .await?;
        Ok(result)
    }

    /// Flag a handle as verified in the draft and save immediately.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the handle has no username, or
    /// any error from [`Self::save`].
    pub async fn mark_verified(&mut self, platform: &str) -> Result<UpdateProfileResult, ClientError> {
        self.draft_mut()?.mark_verified(platform)?;
        self.save().await
    }

    /// # Errors
    ///
    /// Returns `ClientError::InvalidState` when not editing.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), ClientError> {
        self.draft_mut()?.set_name(name);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ClientError::InvalidState` when not editing, or
    /// `ClientError::Validation` for an invalid age.
    pub fn set_age(&mut self, text: &str) -> Result<(), ClientError> {
        self.draft_mut()?.set_age(text)
    }

    /// # Errors
    ///
    /// Returns `ClientError::InvalidState` when not editing.
    pub fn set_gender(&mut self, gender: Option<Gender>) -> Result<(), ClientError> {
        self.draft_mut()?.set_gender(gender);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ClientError::InvalidState` when not editing, or
    /// `ClientError::Validation` for an empty platform name.
    pub fn set_handle_username(
        &mut self,
        platform: &str,
        username: impl Into<String>,
    ) -> Result<(), ClientError> {
        self.draft_mut()?.set_handle_username(platform, username)
    }

    /// Returns whether the trait is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidState` when not editing.
    pub fn toggle_selected_trait(&mut self, item: Trait) -> Result<bool, ClientError> {
        Ok(self.draft_mut()?.toggle_selected_trait(item))
    }

    /// Returns whether the trait is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidState` when not editing.
    pub fn toggle_wanted_trait(&mut self, item: Trait) -> Result<bool, ClientError> {
        Ok(self.draft_mut()?.toggle_wanted_trait(item))
    }

    /// End the session and delete both persisted local stores.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if a store cannot be deleted.
    #[instrument(skip(self), fields(user_id = %self.user_id))]
    pub async fn logout(self) -> Result<(), ClientError> {
        self.storage.remove(PROFILE_STORE_KEY).await?;
        self.storage.remove(SOCIAL_HANDLES_STORE_KEY).await?;
        info!("Session ended, local profile removed");
        Ok(())
    }
}
