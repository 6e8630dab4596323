//! Social account verification state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Errors that can occur when rebuilding a [`Verification`] from stored parts.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// The stored status string is not recognized.
    #[error("unknown verification status: {0}")]
    UnknownStatus(String),
    /// A verified account has no verification timestamp.
    #[error("verified account is missing its verification timestamp")]
    MissingTimestamp,
}

/// Verification status without its timestamp, as stored and sent on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
}

impl VerificationStatus {
    /// Map the legacy `isVerified` flag onto a status.
    #[must_use]
    pub const fn from_flag(verified: bool) -> Self {
        if verified {
            Self::Verified
        } else {
            Self::Unverified
        }
    }

    /// Database representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Verified => "verified",
        }
    }

    /// Parse the database representation.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::UnknownStatus` for anything else.
    pub fn parse(s: &str) -> Result<Self, VerificationError> {
        match s {
            "unverified" => Ok(Self::Unverified),
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            other => Err(VerificationError::UnknownStatus(other.to_owned())),
        }
    }
}

/// Verification of a social account, with the moment it was verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verification {
    /// No verification requested.
    #[default]
    Unverified,
    /// Verification started with the external provider but not confirmed.
    Pending,
    /// Confirmed by the external provider.
    Verified {
        /// When the account was first confirmed.
        at: DateTime<Utc>,
    },
}

impl Verification {
    /// Rebuild from a stored status and timestamp.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::MissingTimestamp` if the status is
    /// `verified` but no timestamp is stored.
    pub const fn from_parts(
        status: VerificationStatus,
        verified_at: Option<DateTime<Utc>>,
    ) -> Result<Self, VerificationError> {
        match (status, verified_at) {
            (VerificationStatus::Unverified, _) => Ok(Self::Unverified),
            (VerificationStatus::Pending, _) => Ok(Self::Pending),
            (VerificationStatus::Verified, Some(at)) => Ok(Self::Verified { at }),
            (VerificationStatus::Verified, None) => Err(VerificationError::MissingTimestamp),
        }
    }

    /// The status without its timestamp.
    #[must_use]
    pub const fn status(&self) -> VerificationStatus {
        match self {
            Self::Unverified => VerificationStatus::Unverified,
            Self::Pending => VerificationStatus::Pending,
            Self::Verified { .. } => VerificationStatus::Verified,
        }
    }

    /// When the account was verified, if it is.
    #[must_use]
    pub const fn verified_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Verified { at } => Some(*at),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }

    /// Move to the `requested` status.
    ///
    /// An account that is already verified keeps its original timestamp
    /// when verified again; otherwise `now` becomes the verification time.
    #[must_use]
    pub const fn transition(self, requested: VerificationStatus, now: DateTime<Utc>) -> Self {
        match (self, requested) {
            (Self::Verified { at }, VerificationStatus::Verified) => Self::Verified { at },
            (_, VerificationStatus::Verified) => Self::Verified { at: now },
            (_, VerificationStatus::Pending) => Self::Pending,
            (_, VerificationStatus::Unverified) => Self::Unverified,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_from_flag() {
        assert_eq!(
            VerificationStatus::from_flag(true),
            VerificationStatus::Verified
        );
        assert_eq!(
            VerificationStatus::from_flag(false),
            VerificationStatus::Unverified
        );
    }

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            VerificationStatus::Unverified,
            VerificationStatus::Pending,
            VerificationStatus::Verified,
        ] {
            assert_eq!(VerificationStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(matches!(
            VerificationStatus::parse("verified-ish"),
            Err(VerificationError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_from_parts_requires_timestamp_when_verified() {
        assert_eq!(
            Verification::from_parts(VerificationStatus::Verified, None),
            Err(VerificationError::MissingTimestamp)
        );
        assert_eq!(
            Verification::from_parts(VerificationStatus::Verified, Some(at(1))).unwrap(),
            Verification::Verified { at: at(1) }
        );
        assert_eq!(
            Verification::from_parts(VerificationStatus::Unverified, Some(at(1))).unwrap(),
            Verification::Unverified
        );
    }

    #[test]
    fn test_transition_stamps_first_verification() {
        let v = Verification::Unverified.transition(VerificationStatus::Verified, at(3));
        assert_eq!(v.verified_at(), Some(at(3)));
        assert!(v.is_verified());
    }

    #[test]
    fn test_transition_keeps_original_timestamp() {
        let v = Verification::Verified { at: at(1) }
            .transition(VerificationStatus::Verified, at(5));
        assert_eq!(v.verified_at(), Some(at(1)));
    }

    #[test]
    fn test_transition_unverify_clears_timestamp() {
        let v = Verification::Verified { at: at(1) }
            .transition(VerificationStatus::Unverified, at(5));
        assert_eq!(v, Verification::Unverified);
        assert_eq!(v.verified_at(), None);
    }
}
