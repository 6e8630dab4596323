//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! heartline-cli user create alice "Alice" --email alice@example.com
//! heartline-cli user rename alice "Alice W"
//! ```
//!
//! These commands write to the database directly. A running server keeps
//! serving its cached profile view until the entry expires, so a rename shows
//! up there after at most `HEARTLINE_PROFILE_CACHE_TTL_SECS`.

use std::sync::Arc;

use heartline_core::UserId;
use heartline_server::db::{PgProfileRepository, ProfileRepository};
use heartline_server::services::ProfileService;

use super::{CommandError, connect, profile_service};

fn parse_id(user_id: &str) -> Result<UserId, CommandError> {
    UserId::parse(user_id).map_err(|e| CommandError::InvalidArgument(e.to_string()))
}

/// Create a user record.
pub async fn create(user_id: &str, name: &str, email: Option<&str>) -> Result<(), CommandError> {
    let user_id = parse_id(user_id)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CommandError::InvalidArgument("name cannot be empty".to_owned()));
    }
    if let Some(email) = email
        && (!email.contains('@') || !email.contains('.'))
    {
        return Err(CommandError::InvalidArgument(format!("invalid email: {email}")));
    }

    let repo = PgProfileRepository::new(connect().await?);
    let user = repo.create_user(&user_id, name, email).await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(())
}

/// Change a user's display name.
///
/// Goes through the same validation as the profile API. Only this process's
/// cache is invalidated; see the module docs for running servers.
pub async fn rename(user_id: &str, name: &str) -> Result<(), CommandError> {
    let repo = PgProfileRepository::new(connect().await?);
    rename_with(&profile_service(Arc::new(repo)), user_id, name).await
}

async fn rename_with(service: &ProfileService, user_id: &str, name: &str) -> Result<(), CommandError> {
    service.update_name(user_id, name).await?;

    tracing::info!(user_id, "User renamed");
    Ok(())
}
