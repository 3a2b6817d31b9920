//! Voice variant value object
//!
//! The gender variant a learner picked for the reading voice.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// Preferred voice variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceVariant {
    /// Female voice
    #[default]
    Female,
    /// Male voice
    Male,
}

impl VoiceVariant {
    /// Get the lowercase identifier used in configuration
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "female",
            Self::Male => "male",
        }
    }

    /// Get all variants
    #[must_use]
    pub const fn all() -> [Self; 2] {
        [Self::Female, Self::Male]
    }
}

impl fmt::Display for VoiceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VoiceVariant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "f" => Ok(Self::Female),
            "male" | "m" => Ok(Self::Male),
            other => Err(DomainError::InvalidVoiceVariant(other.to_string())),
        }
    }
}
