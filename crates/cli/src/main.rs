//! Heartline CLI - Database migrations and profile management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! heartline-cli migrate
//!
//! # Create a user
//! heartline-cli user create alice "Alice" --email alice@example.com
//!
//! # Rename a user
//! heartline-cli user rename alice "Alice W"
//!
//! # Print a profile as JSON
//! heartline-cli profile show alice
//! ```
//!
//! # Environment Variables
//!
//! - `HEARTLINE_DATABASE_URL` - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "heartline-cli")]
#[command(author, version, about = "Heartline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Inspect profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// User id issued by the auth provider
        user_id: String,

        /// Display name
        name: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Change a user's display name
    Rename {
        user_id: String,
        name: String,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Print the profile view as JSON
    Show { user_id: String },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                user_id,
                name,
                email,
            } => commands::user::create(&user_id, &name, email.as_deref()).await?,
            UserAction::Rename { user_id, name } => {
                commands::user::rename(&user_id, &name).await?;
            }
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show { user_id } => commands::profile::show(&user_id).await?,
        },
    }
    Ok(())
}
