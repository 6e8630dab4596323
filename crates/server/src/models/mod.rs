//! Domain models for the profile service.

pub mod profile;

pub use profile::{HandleUpsert, SocialAccount, User};
