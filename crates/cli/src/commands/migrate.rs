//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! heartline-cli migrate
//! ```
//!
//! Migrations live in `crates/server/migrations/` and are embedded into the
//! server crate, so the CLI and the server always agree on the schema.

use heartline_server::db::MIGRATOR;

use super::{CommandError, connect};

/// Run all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
