//! Profile API routes.
//!
//! JSON endpoints consumed by the profile screen. The `user_id` path
//! parameter is resolved by the upstream auth proxy.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

use heartline_core::VerificationStatus;
use heartline_core::api::{
    ActionResponse, HandleOutcome, ProfileTraits, ProfileView, UpdateNameRequest,
    UpdateProfileRequest, UpdateProfileResult, UpsertSocialRequest,
};

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Load the profile view.
///
/// GET /api/profile/{user_id}
///
/// # Errors
///
/// Returns 400 for an empty id, 404 for an unknown user and 500 if storage fails.
pub async fn show(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ActionResponse<ProfileView>>> {
    let view = state
        .profiles()
        .get_profile(&user_id)
        .await
        .map_err(AppError::read)?;

    Ok(Json(ActionResponse::ok(view)))
}

/// Update name and social handles in one atomic write.
///
/// PUT /api/profile/{user_id}
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown user, 409 on a
/// concurrent duplicate and 500 if storage fails.
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ActionResponse<UpdateProfileResult>>> {
    let Json(request) = payload?;

    let result = state
        .profiles()
        .update_profile(&user_id, &request)
        .await
        .map_err(AppError::write)?;

    Ok(Json(ActionResponse::ok(result)))
}

/// Change the display name only.
///
/// PUT /api/profile/{user_id}/name
///
/// # Errors
///
/// Returns 400 for missing fields, 404 for an unknown user and 500 if storage fails.
pub async fn update_name(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<UpdateNameRequest>, JsonRejection>,
) -> Result<Json<ActionResponse<()>>> {
    let Json(request) = payload?;

    state
        .profiles()
        .update_name(&user_id, &request.name)
        .await
        .map_err(AppError::write)?;

    Ok(Json(ActionResponse::done()))
}

/// Create or update the account for one platform.
///
/// PUT /api/profile/{user_id}/social/{platform}
///
/// # Errors
///
/// Returns 400 for an empty id or platform, 404 for an unknown user, 409 on
/// a concurrent duplicate and 500 if storage fails.
pub async fn upsert_social(
    State(state): State<AppState>,
    Path((user_id, platform)): Path<(String, String)>,
    payload: std::result::Result<Json<UpsertSocialRequest>, JsonRejection>,
) -> Result<Json<ActionResponse<HandleOutcome>>> {
    let Json(request) = payload?;
    let status = request
        .verification
        .unwrap_or_else(|| VerificationStatus::from_flag(request.is_verified));

    let outcome = state
        .profiles()
        .upsert_social_account(&user_id, &platform, &request.username, status)
        .await
        .map_err(AppError::write)?;

    Ok(Json(ActionResponse::ok(HandleOutcome {
        platform: platform.trim().to_lowercase(),
        outcome,
    })))
}

/// Replace the onboarding answers.
///
/// PUT /api/profile/{user_id}/traits
///
/// # Errors
///
/// Returns 400 for an invalid body, 404 for an unknown user and 500 if storage fails.
pub async fn save_traits(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: std::result::Result<Json<ProfileTraits>, JsonRejection>,
) -> Result<Json<ActionResponse<()>>> {
    let Json(traits) = payload?;

    state
        .profiles()
        .save_traits(&user_id, &traits)
        .await
        .map_err(AppError::write)?;

    Ok(Json(ActionResponse::done()))
}
