//! Language code value object
//!
//! A BCP-47 style tag such as `es-ES` or `en-US`, as understood by speech
//! providers and local speech engines.
//!
//! # Examples
//!
//! ```
//! use domain::LanguageCode;
//!
//! let code = LanguageCode::new("en-us").unwrap();
//! assert_eq!(code.as_str(), "en-US");
//! assert_eq!(code.primary(), "en");
//!
//! assert!(LanguageCode::new("").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// A validated, normalized language tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode {
    value: String,
}

impl LanguageCode {
    /// Create a language code, normalizing case
    ///
    /// The primary subtag is lowercased, a two-letter region subtag is
    /// uppercased. Underscores are accepted as separators (`de_DE`).
    ///
    /// # Errors
    ///
    /// Returns an error if the primary subtag is not 2-3 ASCII letters or a
    /// later subtag is empty or not alphanumeric.
    pub fn new(code: impl AsRef<str>) -> Result<Self, DomainError> {
        let raw = code.as_ref().trim();
        let mut parts = raw.split(['-', '_']);

        let primary = parts.next().unwrap_or_default();
        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(DomainError::InvalidLanguageCode(raw.to_string()));
        }

        let mut value = primary.to_ascii_lowercase();
        for part in parts {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(DomainError::InvalidLanguageCode(raw.to_string()));
            }
            value.push('-');
            if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                value.push_str(&part.to_ascii_uppercase());
            } else {
                value.push_str(part);
            }
        }

        Ok(Self { value })
    }

    /// Get the normalized tag
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Get the primary language subtag (`en` for `en-US`)
    pub fn primary(&self) -> &str {
        self.value.split('-').next().unwrap_or(&self.value)
    }

    /// Check whether both codes share the same primary subtag
    ///
    /// ```
    /// use domain::LanguageCode;
    ///
    /// let us = LanguageCode::new("en-US").unwrap();
    /// let gb = LanguageCode::new("en-GB").unwrap();
    /// assert!(us.same_language(&gb));
    /// ```
    pub fn same_language(&self, other: &Self) -> bool {
        self.primary() == other.primary()
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl FromStr for LanguageCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case() {
        let code = LanguageCode::new("ES-es").unwrap();
        assert_eq!(code.as_str(), "es-ES");
    }

    #[test]
    fn accepts_underscore_separator() {
        let code = LanguageCode::new("de_DE").unwrap();
        assert_eq!(code.as_str(), "de-DE");
    }

    #[test]
    fn accepts_bare_primary_subtag() {
        let code = LanguageCode::new("en").unwrap();
        assert_eq!(code.as_str(), "en");
        assert_eq!(code.primary(), "en");
    }

    #[test]
    fn keeps_numeric_region() {
        let code = LanguageCode::new("es-419").unwrap();
        assert_eq!(code.as_str(), "es-419");
    }

    #[test]
    fn rejects_invalid_codes() {
        assert!(LanguageCode::new("").is_err());
        assert!(LanguageCode::new("e").is_err());
        assert!(LanguageCode::new("english").is_err());
        assert!(LanguageCode::new("en-").is_err());
        assert!(LanguageCode::new("en-U S").is_err());
    }

    #[test]
    fn primary_subtag() {
        assert_eq!(LanguageCode::new("en-GB").unwrap().primary(), "en");
        assert_eq!(LanguageCode::new("yue-HK").unwrap().primary(), "yue");
    }

    #[test]
    fn same_language_compares_primary() {
        let es = LanguageCode::new("es-ES").unwrap();
        let mx = LanguageCode::new("es-MX").unwrap();
        let en = LanguageCode::new("en-US").unwrap();
        assert!(es.same_language(&mx));
        assert!(!es.same_language(&en));
    }

    #[test]
    fn serde_uses_plain_string() {
        let code = LanguageCode::new("en-us").unwrap();
        let json = serde_json::to_string(&code).expect("serialize");
        assert_eq!(json, "\"en-US\"");

        let parsed: LanguageCode = serde_json::from_str("\"es_es\"").expect("deserialize");
        assert_eq!(parsed.as_str(), "es-ES");

        assert!(serde_json::from_str::<LanguageCode>("\"x\"").is_err());
    }

    #[test]
    fn from_str_parses() {
        let code: LanguageCode = "fr-FR".parse().unwrap();
        assert_eq!(code.to_string(), "fr-FR");
    }
}
