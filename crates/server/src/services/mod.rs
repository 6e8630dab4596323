//! Business logic services.
//!
//! # Services
//!
//! - `profile` - Profile reads and writes (name, social handles, onboarding traits)

pub mod profile;

pub use profile::{ProfileError, ProfileService};
