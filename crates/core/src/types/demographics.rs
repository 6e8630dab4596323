//! Age and gender fields collected during onboarding.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Gender options offered by the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[serde(rename = "Non-binary")]
    NonBinary,
    Other,
}

impl Gender {
    /// Display and storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::NonBinary => "Non-binary",
            Self::Other => "Other",
        }
    }

    /// Parse the display representation. Returns `None` for unknown values.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Male" => Some(Self::Male),
            "Female" => Some(Self::Female),
            "Non-binary" => Some(Self::NonBinary),
            "Other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur when parsing an [`Age`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AgeError {
    #[error("age must be a whole number")]
    NotANumber,
    #[error("age must be between {min} and {max}")]
    OutOfRange { min: u8, max: u8 },
}

/// A user's age in years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Age(u8);

impl Age {
    pub const MIN: u8 = 18;
    pub const MAX: u8 = 120;

    /// Create an age, checking the allowed range.
    ///
    /// # Errors
    ///
    /// Returns `AgeError::OutOfRange` outside `MIN..=MAX`.
    pub const fn new(years: u8) -> Result<Self, AgeError> {
        if years < Self::MIN || years > Self::MAX {
            return Err(AgeError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(years))
    }

    /// Parse the text typed into the age field.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a number or is out of range.
    pub fn parse(s: &str) -> Result<Self, AgeError> {
        let years = s
            .trim()
            .parse::<u16>()
            .map_err(|_| AgeError::NotANumber)?;
        let years = u8::try_from(years).map_err(|_| AgeError::OutOfRange {
            min: Self::MIN,
            max: Self::MAX,
        })?;
        Self::new(years)
    }

    #[must_use]
    pub const fn years(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for Age {
    type Error = AgeError;

    fn try_from(years: u8) -> Result<Self, Self::Error> {
        Self::new(years)
    }
}

impl From<Age> for u8 {
    fn from(age: Age) -> Self {
        age.0
    }
}
