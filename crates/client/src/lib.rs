//! Heartline Client - Profile draft store.
//!
//! Holds the signed-in user's profile on the client side: a committed copy
//! rehydrated from local storage and refreshed from the server, and an edit
//! draft that is saved back through the profile API.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use heartline_client::{ClientConfig, FileStorage, HttpGateway, ProfileSession};
//!
//! let config = ClientConfig::from_env()?;
//! let mut session = ProfileSession::new(
//!     user_id,
//!     Arc::new(HttpGateway::new(&config)),
//!     Arc::new(FileStorage::new(&config.data_dir)),
//! );
//! session.load().await?;
//!
//! session.begin_edit();
//! session.set_handle_username("Twitter", "alice_w")?;
//! session.mark_verified("Twitter").await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod session;
pub mod storage;

pub use config::ClientConfig;
pub use draft::{ProfileDraft, SocialHandleDraft};
pub use error::ClientError;
pub use gateway::{HttpGateway, ProfileGateway};
pub use session::{Mode, ProfileSession};
pub use storage::{DraftStorage, FileStorage, MemoryStorage};
