//! Profile inspection command.
//!
//! # Usage
//!
//! ```bash
//! heartline-cli profile show alice
//! ```

use std::sync::Arc;

use heartline_server::db::PgProfileRepository;

use super::{CommandError, connect, profile_service};

/// Print the profile view of a user as JSON.
pub async fn show(user_id: &str) -> Result<(), CommandError> {
    let repo = PgProfileRepository::new(connect().await?);
    let service = profile_service(Arc::new(repo));

    let view = service.get_profile(user_id).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&view)?);
    }
    Ok(())
}
