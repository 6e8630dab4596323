//! Wire types shared by the server and the client.
//!
//! Field names are camelCase on the wire. Every endpoint answers with an
//! [`ActionResponse`] envelope so that failures always have the same shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    Age, Gender, PlatformKey, TraitSelection, UserId, Verification, VerificationStatus,
};

/// Uniform response envelope: `{success, error?, data?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ActionResponse<T> {
    /// Successful response carrying `data`.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    /// Successful response without a payload.
    #[must_use]
    pub const fn done() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    /// Failed response with a user-facing message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            data: None,
        }
    }

    /// Collapse the envelope into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the error message when `success` is false. A failure without
    /// a message becomes `"Unknown error"`.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(|| "Unknown error".to_owned()))
        }
    }
}

/// The user record as returned by `getProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A social handle as shown to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialHandle {
    pub platform: PlatformKey,
    pub username: String,
    pub is_verified: bool,
    pub verification: VerificationStatus,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

impl SocialHandle {
    /// Project a stored account onto the client view.
    ///
    /// A missing external account id becomes an empty username.
    #[must_use]
    pub fn project(
        platform: PlatformKey,
        account_id: Option<String>,
        verification: Verification,
    ) -> Self {
        Self {
            platform,
            username: account_id.unwrap_or_default(),
            is_verified: verification.is_verified(),
            verification: verification.status(),
            verified_at: verification.verified_at(),
        }
    }
}

/// A handle submitted by the client.
///
/// `isVerified` is the original boolean flag; `verification` takes
/// precedence when present so clients can report `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialHandleInput {
    pub platform: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationStatus>,
}

impl SocialHandleInput {
    pub fn new(platform: impl Into<String>, username: impl Into<String>, is_verified: bool) -> Self {
        Self {
            platform: platform.into(),
            username: username.into(),
            is_verified,
            verification: None,
        }
    }

    /// The verification status this input asks for.
    #[must_use]
    pub fn requested_status(&self) -> VerificationStatus {
        self.verification
            .unwrap_or_else(|| VerificationStatus::from_flag(self.is_verified))
    }
}

/// Onboarding answers stored alongside the profile.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileTraits {
    #[serde(default)]
    pub age: Option<Age>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub selected_traits: TraitSelection,
    #[serde(default)]
    pub wanted_traits: TraitSelection,
}

/// Read projection returned by `getProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user: UserRecord,
    pub social_handles: Vec<SocialHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<ProfileTraits>,
}

/// Body of `PUT /api/profile/{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub social_handles: Vec<SocialHandleInput>,
}

/// Body of `PUT /api/profile/{user_id}/name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNameRequest {
    #[serde(default)]
    pub name: String,
}

/// Body of `PUT /api/profile/{user_id}/social/{platform}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSocialRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationStatus>,
}

/// What an upsert did for one platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// The username was empty so nothing was written.
    Skipped,
}

/// Per-handle result of a profile update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandleOutcome {
    pub platform: String,
    pub outcome: UpsertOutcome,
}

/// Data returned by a successful `updateProfile`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UpdateProfileResult {
    pub handles: Vec<HandleOutcome>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_failure_shape() {
        let resp: ActionResponse<()> = ActionResponse::failure("User not found");
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({"success": false, "error": "User not found"})
        );
    }

    #[test]
    fn test_done_shape() {
        let resp: ActionResponse<()> = ActionResponse::done();
        assert_eq!(serde_json::to_value(&resp).unwrap(), json!({"success": true}));
    }

    #[test]
    fn test_into_result() {
        let ok: ActionResponse<u32> = ActionResponse::ok(7);
        assert_eq!(ok.into_result(), Ok(Some(7)));

        let err: ActionResponse<u32> = serde_json::from_value(json!({"success": false})).unwrap();
        assert_eq!(err.into_result(), Err("Unknown error".to_owned()));
    }

    #[test]
    fn test_profile_envelope_deserializes() {
        let resp: ActionResponse<ProfileView> = serde_json::from_value(json!({
            "success": true,
            "data": {
                "user": {
                    "id": "alice",
                    "name": "Alice",
                    "createdAt": "2026-03-01T12:00:00Z",
                    "updatedAt": "2026-03-01T12:00:00Z"
                },
                "socialHandles": [{
                    "platform": "twitter",
                    "username": "alice_w",
                    "isVerified": false,
                    "verification": "pending",
                    "verifiedAt": null
                }]
            }
        }))
        .unwrap();

        let view = resp.into_result().unwrap().unwrap();
        assert_eq!(view.user.name, "Alice");
        assert_eq!(view.social_handles[0].verification, VerificationStatus::Pending);
        assert_eq!(view.traits, None);

        let missing: ActionResponse<ProfileView> =
            serde_json::from_value(json!({"success": false, "error": "User not found"})).unwrap();
        assert_eq!(missing.into_result(), Err("User not found".to_owned()));
    }

    #[test]
    fn test_handle_input_accepts_legacy_flag() {
        let input: SocialHandleInput = serde_json::from_value(json!({
            "platform": "Twitter",
            "username": "alice_w",
            "isVerified": true
        }))
        .unwrap();
        assert_eq!(input.requested_status(), VerificationStatus::Verified);
    }

    #[test]
    fn test_handle_input_explicit_status_wins() {
        let input: SocialHandleInput = serde_json::from_value(json!({
            "platform": "Twitter",
            "username": "alice_w",
            "isVerified": true,
            "verification": "pending"
        }))
        .unwrap();
        assert_eq!(input.requested_status(), VerificationStatus::Pending);
    }

    #[test]
    fn test_project_missing_account_id() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let handle = SocialHandle::project(
            PlatformKey::parse("telegram").unwrap(),
            None,
            Verification::Verified { at },
        );
        assert_eq!(handle.username, "");
        assert!(handle.is_verified);
        assert_eq!(handle.verified_at, Some(at));

        let json = serde_json::to_value(&handle).unwrap();
        assert_eq!(json["isVerified"], json!(true));
        assert_eq!(json["platform"], json!("telegram"));
    }

    #[test]
    fn test_outcome_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UpsertOutcome::Skipped).unwrap(),
            "\"skipped\""
        );
    }
}
