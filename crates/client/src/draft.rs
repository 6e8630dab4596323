//! Profile draft and its persisted local stores.
//!
//! The draft is split across two independently persisted stores, matching
//! what the profile screen rehydrates on start:
//!
//! - `profile-storage`: name, age, gender and both trait lists
//! - `social-handles-storage`: social handle rows with their profile URLs

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use heartline_core::api::{
    ProfileTraits, ProfileView, SocialHandle, SocialHandleInput, UpdateProfileRequest,
};
use heartline_core::{Age, Gender, PlatformKey, Trait, TraitSelection, VerificationStatus};

use crate::error::ClientError;
use crate::storage::DraftStorage;

/// Storage key of the profile store.
pub const PROFILE_STORE_KEY: &str = "profile-storage";
/// Storage key of the social handles store.
pub const SOCIAL_HANDLES_STORE_KEY: &str = "social-handles-storage";

/// A social handle row as edited on the profile screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialHandleDraft {
    /// Platform name as displayed ("Twitter").
    pub platform: String,
    pub username: String,
    #[serde(default)]
    pub verification: VerificationStatus,
    /// Profile URL prefix for the platform, empty if unknown.
    #[serde(default)]
    pub url: String,
}

impl SocialHandleDraft {
    #[must_use]
    pub fn new(
        platform: impl Into<String>,
        username: impl Into<String>,
        verification: VerificationStatus,
    ) -> Self {
        let platform = platform.into();
        let url = PlatformKey::parse(&platform)
            .ok()
            .and_then(|key| key.profile_url_prefix())
            .unwrap_or_default()
            .to_owned();

        Self {
            platform,
            username: username.into(),
            verification,
            url,
        }
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verification == VerificationStatus::Verified
    }

    /// Canonical key of this row's platform.
    #[must_use]
    pub fn key(&self) -> Option<PlatformKey> {
        PlatformKey::parse(&self.platform).ok()
    }

    fn is_platform(&self, key: &PlatformKey) -> bool {
        self.key().as_ref() == Some(key)
    }

    /// Link to the user's profile on the platform, if known and filled in.
    #[must_use]
    pub fn profile_link(&self) -> Option<String> {
        self.key()?.profile_url(&self.username)
    }
}

/// Display name for a platform key coming from the server ("twitter" -> "Twitter").
fn display_platform(key: &PlatformKey) -> String {
    let mut chars = key.as_str().chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Persisted shape of `profile-storage`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileStore {
    pub name: String,
    pub age: Option<Age>,
    pub gender: Option<Gender>,
    pub selected_traits: TraitSelection,
    pub wanted_traits: TraitSelection,
}

/// Persisted shape of `social-handles-storage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHandlesStore {
    pub handles: Vec<SocialHandleDraft>,
}

impl Default for SocialHandlesStore {
    /// Email, Twitter and Telegram rows with empty usernames.
    fn default() -> Self {
        Self {
            handles: ["Email", "Twitter", "Telegram"]
                .into_iter()
                .map(|platform| SocialHandleDraft::new(platform, "", VerificationStatus::Unverified))
                .collect(),
        }
    }
}

/// Everything the profile screen can edit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileDraft {
    pub name: String,
    pub age: Option<Age>,
    pub gender: Option<Gender>,
    pub selected_traits: TraitSelection,
    pub wanted_traits: TraitSelection,
    pub social_handles: Vec<SocialHandleDraft>,
}

impl ProfileDraft {
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Set the age from the text in the age field. Empty text clears it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the text is not a valid age.
    pub fn set_age(&mut self, text: &str) -> Result<(), ClientError> {
        if text.trim().is_empty() {
            self.age = None;
            return Ok(());
        }
        self.age = Some(Age::parse(text).map_err(|e| ClientError::Validation(e.to_string()))?);
        Ok(())
    }

    pub const fn set_gender(&mut self, gender: Option<Gender>) {
        self.gender = gender;
    }

    /// Toggle a "what I am" trait. Returns `true` if it is selected afterwards.
    pub fn toggle_selected_trait(&mut self, item: Trait) -> bool {
        self.selected_traits.toggle(item)
    }

    /// Toggle a "what I want" trait. Returns `true` if it is selected afterwards.
    pub fn toggle_wanted_trait(&mut self, item: Trait) -> bool {
        self.wanted_traits.toggle(item)
    }

    /// Find the handle row for a platform, matching case-insensitively.
    #[must_use]
    pub fn handle(&self, platform: &str) -> Option<&SocialHandleDraft> {
        let key = PlatformKey::parse(platform).ok()?;
        self.social_handles.iter().find(|h| h.is_platform(&key))
    }

    fn handle_mut(&mut self, key: &PlatformKey) -> Option<&mut SocialHandleDraft> {
        self.social_handles.iter_mut().find(|h| h.is_platform(key))
    }

    /// Set the username for a platform, adding a row for unknown platforms.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the platform name is empty.
    pub fn set_handle_username(
        &mut self,
        platform: &str,
        username: impl Into<String>,
    ) -> Result<(), ClientError> {
        let key = PlatformKey::parse(platform).map_err(|e| ClientError::Validation(e.to_string()))?;
        let username = username.into();

        match self.handle_mut(&key) {
            Some(handle) => handle.username = username,
            None => self
                .social_handles
                .push(SocialHandleDraft::new(
                    platform.trim(),
                    username,
                    VerificationStatus::Unverified,
                )),
        }
        Ok(())
    }

    /// Flag a handle as verified.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if the platform has no row or the
    /// row has no username yet.
    pub fn mark_verified(&mut self, platform: &str) -> Result<(), ClientError> {
        let key = PlatformKey::parse(platform).map_err(|e| ClientError::Validation(e.to_string()))?;
        let handle = self
            .handle_mut(&key)
            .ok_or_else(|| ClientError::Validation(format!("No {platform} handle to verify")))?;

        if handle.username.trim().is_empty() {
            return Err(ClientError::Validation(format!(
                "Enter a {} username before verifying",
                handle.platform
            )));
        }
        handle.verification = VerificationStatus::Verified;
        Ok(())
    }

    /// Request body for `updateProfile`.
    #[must_use]
    pub fn to_update_request(&self) -> UpdateProfileRequest {
        UpdateProfileRequest {
            name: self.name.clone(),
            social_handles: self
                .social_handles
                .iter()
                .map(|h| SocialHandleInput {
                    verification: Some(h.verification),
                    ..SocialHandleInput::new(&h.platform, &h.username, h.is_verified())
                })
                .collect(),
        }
    }

    /// Request body for `saveTraits`.
    #[must_use]
    pub fn to_traits(&self) -> ProfileTraits {
        ProfileTraits {
            age: self.age,
            gender: self.gender,
            selected_traits: self.selected_traits.clone(),
            wanted_traits: self.wanted_traits.clone(),
        }
    }

    /// Merge the server's committed profile into this local copy.
    ///
    /// Server name and handles win. Local rows for platforms the server does
    /// not know are kept. Age, gender and traits are replaced only when the
    /// server has stored traits.
    pub fn merge_server(&mut self, view: ProfileView) {
        self.name = view.user.name;

        for SocialHandle {
            platform,
            username,
            verification,
            ..
        } in view.social_handles
        {
            match self.handle_mut(&platform) {
                Some(local) => {
                    local.username = username;
                    local.verification = verification;
                }
                None => self.social_handles.push(SocialHandleDraft::new(
                    display_platform(&platform),
                    username,
                    verification,
                )),
            }
        }

        if let Some(traits) = view.traits {
            self.age = traits.age;
            self.gender = traits.gender;
            self.selected_traits = traits.selected_traits;
            self.wanted_traits = traits.wanted_traits;
        }
    }

    fn from_stores(profile: ProfileStore, handles: SocialHandlesStore) -> Self {
        Self {
            name: profile.name,
            age: profile.age,
            gender: profile.gender,
            selected_traits: profile.selected_traits,
            wanted_traits: profile.wanted_traits,
            social_handles: handles.handles,
        }
    }

    fn profile_store(&self) -> ProfileStore {
        ProfileStore {
            name: self.name.clone(),
            age: self.age,
            gender: self.gender,
            selected_traits: self.selected_traits.clone(),
            wanted_traits: self.wanted_traits.clone(),
        }
    }

    /// Rehydrate both local stores. Missing or unreadable stores fall back
    /// to their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` if the storage itself fails.
    pub async fn rehydrate(storage: &dyn DraftStorage) -> Result<Self, ClientError> {
        let profile: ProfileStore = read_store(storage, PROFILE_STORE_KEY).await?;
        let handles: SocialHandlesStore = read_store(storage, SOCIAL_HANDLES_STORE_KEY).await?;
        Ok(Self::from_stores(profile, handles))
    }

    /// Persist both local stores.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Storage` or `ClientError::Serialization` on failure.
    pub async fn persist(&self, storage: &dyn DraftStorage) -> Result<(), ClientError> {
        let profile = serde_json::to_string(&self.profile_store())?;
        let handles = serde_json::to_string(&SocialHandlesStore {
            handles: self.social_handles.clone(),
        })?;

        storage.write(PROFILE_STORE_KEY, &profile).await?;
        storage.write(SOCIAL_HANDLES_STORE_KEY, &handles).await?;
        Ok(())
    }
}

async fn read_store<T>(storage: &dyn DraftStorage, key: &str) -> Result<T, ClientError>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = storage.read(key).await? else {
        return Ok(T::default());
    };

    Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "Discarding unreadable local store");
        T::default()
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use heartline_core::api::UserRecord;
    use heartline_core::{TraitCategory, UserId};

    use super::*;
    use crate::storage::MemoryStorage;

    fn server_view(handles: Vec<SocialHandle>, traits: Option<ProfileTraits>) -> ProfileView {
        let now = Utc::now();
        ProfileView {
            user: UserRecord {
                id: UserId::parse("alice").unwrap(),
                name: "Alice (server)".to_owned(),
                email: None,
                created_at: now,
                updated_at: now,
            },
            social_handles: handles,
            traits,
        }
    }

    fn server_handle(platform: &str, username: &str, verified: bool) -> SocialHandle {
        SocialHandle {
            platform: PlatformKey::parse(platform).unwrap(),
            username: username.to_owned(),
            is_verified: verified,
            verification: VerificationStatus::from_flag(verified),
            verified_at: verified.then(Utc::now),
        }
    }

    #[test]
    fn test_default_handles() {
        let store = SocialHandlesStore::default();
        let platforms: Vec<_> = store.handles.iter().map(|h| h.platform.as_str()).collect();
        assert_eq!(platforms, ["Email", "Twitter", "Telegram"]);
        assert!(store.handles.iter().all(|h| h.username.is_empty() && !h.is_verified()));
        assert_eq!(store.handles[2].url, "https://t.me/");
    }

    #[test]
    fn test_set_age() {
        let mut draft = ProfileDraft::default();
        draft.set_age("27").unwrap();
        assert_eq!(draft.age.unwrap().years(), 27);
        assert!(matches!(draft.set_age("abc"), Err(ClientError::Validation(_))));
        assert_eq!(draft.age.unwrap().years(), 27);
        draft.set_age("").unwrap();
        assert_eq!(draft.age, None);
    }

    #[test]
    fn test_set_handle_username_adds_unknown_platform() {
        let mut draft = ProfileDraft::from_stores(ProfileStore::default(), SocialHandlesStore::default());
        draft.set_handle_username("twitter", "alice_w").unwrap();
        draft.set_handle_username("GitHub", "alice-gh").unwrap();

        assert_eq!(draft.handle("Twitter").unwrap().username, "alice_w");
        let github = draft.handle("github").unwrap();
        assert_eq!(github.platform, "GitHub");
        assert_eq!(github.profile_link().as_deref(), Some("https://github.com/alice-gh"));
        assert_eq!(draft.social_handles.len(), 4);
    }

    #[test]
    fn test_mark_verified_requires_username() {
        let mut draft = ProfileDraft::from_stores(ProfileStore::default(), SocialHandlesStore::default());
        assert!(matches!(draft.mark_verified("Telegram"), Err(ClientError::Validation(_))));

        draft.set_handle_username("Telegram", "alice_t").unwrap();
        draft.mark_verified("telegram").unwrap();
        assert!(draft.handle("Telegram").unwrap().is_verified());
        assert!(!draft.handle("Twitter").unwrap().is_verified());
    }

    #[test]
    fn test_merge_server_wins_for_name_and_handles() {
        let mut local = ProfileDraft::from_stores(ProfileStore::default(), SocialHandlesStore::default());
        local.set_name("Alice (local)");
        local.set_handle_username("Twitter", "old_handle").unwrap();
        local.set_handle_username("Email", "alice@example.com").unwrap();
        local.set_age("30").unwrap();

        local.merge_server(server_view(
            vec![
                server_handle("twitter", "alice_w", true),
                server_handle("github", "alice-gh", false),
            ],
            None,
        ));

        assert_eq!(local.name, "Alice (server)");
        let twitter = local.handle("Twitter").unwrap();
        assert_eq!(twitter.username, "alice_w");
        assert!(twitter.is_verified());
        assert_eq!(local.handle("Email").unwrap().username, "alice@example.com");
        assert_eq!(local.handle("github").unwrap().platform, "Github");
        // No server traits: local age kept.
        assert_eq!(local.age.unwrap().years(), 30);
    }

    #[test]
    fn test_merge_server_traits_replace_local() {
        let mut local = ProfileDraft::default();
        local.set_age("30").unwrap();
        local.toggle_selected_trait(Trait::new("🥾", "Hiking", TraitCategory::Sports));

        local.merge_server(server_view(
            vec![],
            Some(ProfileTraits {
                age: Some(Age::new(31).unwrap()),
                ..ProfileTraits::default()
            }),
        ));

        assert_eq!(local.age.unwrap().years(), 31);
        assert!(local.selected_traits.is_empty());
    }

    #[test]
    fn test_update_request_shape() {
        let mut draft = ProfileDraft::from_stores(ProfileStore::default(), SocialHandlesStore::default());
        draft.set_name("Alice");
        draft.set_handle_username("Twitter", "alice_w").unwrap();

        let request = draft.to_update_request();
        assert_eq!(request.name, "Alice");
        assert_eq!(request.social_handles.len(), 3);
        assert_eq!(request.social_handles[1].username, "alice_w");
    }

    #[test]
    fn test_pending_status_survives_merge_and_save() {
        let mut local = ProfileDraft::from_stores(ProfileStore::default(), SocialHandlesStore::default());
        let mut pending = server_handle("twitter", "alice_w", false);
        pending.verification = VerificationStatus::Pending;
        local.merge_server(server_view(vec![pending], None));

        let twitter = local.handle("Twitter").unwrap();
        assert_eq!(twitter.verification, VerificationStatus::Pending);
        assert!(!twitter.is_verified());

        local.set_name("Alice W");
        let request = local.to_update_request();
        let sent = &request.social_handles[1];
        assert_eq!(sent.username, "alice_w");
        assert!(!sent.is_verified);
        assert_eq!(sent.verification, Some(VerificationStatus::Pending));
        assert_eq!(sent.requested_status(), VerificationStatus::Pending);
    }

    #[tokio::test]
    async fn test_persist_and_rehydrate() {
        let storage = MemoryStorage::new();
        let mut draft = ProfileDraft::rehydrate(&storage).await.unwrap();
        assert_eq!(draft.social_handles.len(), 3);

        draft.set_name("Alice");
        draft.set_gender(Some(Gender::Female));
        draft.toggle_wanted_trait(Trait::new("🎨", "Painting", TraitCategory::Creativity));
        draft.persist(&storage).await.unwrap();

        let restored = ProfileDraft::rehydrate(&storage).await.unwrap();
        assert_eq!(restored, draft);
    }

    #[tokio::test]
    async fn test_unreadable_store_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.write(PROFILE_STORE_KEY, "not json").await.unwrap();
        storage
            .write(SOCIAL_HANDLES_STORE_KEY, r#"{"handles": []}"#)
            .await
            .unwrap();

        let draft = ProfileDraft::rehydrate(&storage).await.unwrap();
        assert_eq!(draft.name, "");
        assert!(draft.social_handles.is_empty());
    }
}
