//! Social platform keys.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PlatformKey`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformKeyError {
    /// The platform name is empty or whitespace.
    #[error("platform cannot be empty")]
    Empty,
    /// The platform name is too long.
    #[error("platform must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// Canonical, lower-cased name of a social network.
///
/// This is the dedup key for social accounts: a user has at most one
/// account per platform key, so "Twitter", "twitter" and " TWITTER "
/// all refer to the same record.
///
/// ```
/// use heartline_core::PlatformKey;
///
/// let key = PlatformKey::parse(" Twitter ").unwrap();
/// assert_eq!(key.as_str(), "twitter");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct PlatformKey(String);

impl PlatformKey {
    /// Maximum length of a platform key.
    pub const MAX_LENGTH: usize = 64;

    /// Normalize a platform name into its key.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty after trimming or longer than
    /// [`Self::MAX_LENGTH`].
    pub fn parse(s: &str) -> Result<Self, PlatformKeyError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PlatformKeyError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(PlatformKeyError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Base URL that a username is appended to for known platforms.
    #[must_use]
    pub fn profile_url_prefix(&self) -> Option<&'static str> {
        match self.0.as_str() {
            "email" => Some("mailto:"),
            "twitter" | "x" => Some("https://twitter.com/"),
            "telegram" => Some("https://t.me/"),
            "github" => Some("https://github.com/"),
            "instagram" => Some("https://instagram.com/"),
            _ => None,
        }
    }

    /// Link to `username` on this platform, if the platform is known.
    #[must_use]
    pub fn profile_url(&self, username: &str) -> Option<String> {
        if username.is_empty() {
            return None;
        }
        self.profile_url_prefix()
            .map(|prefix| format!("{prefix}{username}"))
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for PlatformKey {
    type Err = PlatformKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlatformKey {
    type Error = PlatformKeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<PlatformKey> for String {
    fn from(key: PlatformKey) -> Self {
        key.0
    }
}

impl AsRef<str> for PlatformKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for PlatformKey {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for PlatformKey {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for PlatformKey {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases() {
        assert_eq!(PlatformKey::parse("Twitter").unwrap().as_str(), "twitter");
        assert_eq!(PlatformKey::parse("GitHub").unwrap().as_str(), "github");
    }

    #[test]
    fn test_case_variants_share_a_key() {
        let a = PlatformKey::parse("TELEGRAM").unwrap();
        let b = PlatformKey::parse(" telegram").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(PlatformKey::parse(" "), Err(PlatformKeyError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = "p".repeat(PlatformKey::MAX_LENGTH + 1);
        assert!(matches!(
            PlatformKey::parse(&long),
            Err(PlatformKeyError::TooLong { .. })
        ));
    }

    #[test]
    fn test_profile_url() {
        let key = PlatformKey::parse("Telegram").unwrap();
        assert_eq!(
            key.profile_url("alice").as_deref(),
            Some("https://t.me/alice")
        );
        assert_eq!(key.profile_url(""), None);

        let unknown = PlatformKey::parse("Mastodon").unwrap();
        assert_eq!(unknown.profile_url("alice"), None);
    }

    #[test]
    fn test_deserialize_normalizes() {
        let key: PlatformKey = serde_json::from_str("\"Instagram\"").unwrap();
        assert_eq!(key.as_str(), "instagram");
        assert!(serde_json::from_str::<PlatformKey>("\"\"").is_err());
    }
}
