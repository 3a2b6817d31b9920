//! Segment language value object

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the bilingual pair a piece of text belongs to
///
/// Native text is read by the learner's native voice, foreign text (marked
/// with `**...**`) by a voice of the exam language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// The learner's own language
    #[default]
    Native,
    /// The language being studied
    Foreign,
}

impl Language {
    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Foreign => "foreign",
        }
    }

    /// Check if this is the studied language
    #[must_use]
    pub const fn is_foreign(&self) -> bool {
        matches!(self, Self::Foreign)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_native() {
        assert_eq!(Language::default(), Language::Native);
    }

    #[test]
    fn is_foreign() {
        assert!(Language::Foreign.is_foreign());
        assert!(!Language::Native.is_foreign());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Language::Foreign).expect("serialize");
        assert_eq!(json, "\"foreign\"");
    }
}
