//! Heartline Core - Shared profile types.
//!
//! This crate provides the types used across all Heartline components:
//! - `server` - Profile synchronization HTTP service
//! - `client` - Draft store that edits and saves a profile
//! - `cli` - Command-line tools for migrations and profile inspection
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. The optional `postgres` feature adds `sqlx`
//! encode/decode support for the identifier newtypes.
//!
//! # Modules
//!
//! - [`types`] - Newtypes for user ids, platform keys, verification and traits
//! - [`api`] - Request/response shapes shared by server and client

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod types;

pub use types::*;
