//! Core types for Heartline.
//!
//! This module provides type-safe wrappers for profile concepts.

pub mod demographics;
pub mod id;
pub mod platform;
pub mod traits;
pub mod verification;

pub use demographics::{Age, AgeError, Gender};
pub use id::{SocialAccountId, UserId, UserIdError};
pub use platform::{PlatformKey, PlatformKeyError};
pub use traits::{Trait, TraitCategory, TraitSelection};
pub use verification::{Verification, VerificationError, VerificationStatus};
