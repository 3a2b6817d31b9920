//! Language-tagged text segment

use serde::{Deserialize, Serialize};

use super::Language;

/// A contiguous run of text spoken in one language
///
/// Text produced by the segmenter is already markup-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Language to speak the text in
    pub language: Language,
    /// Trimmed, escaped text
    pub text: String,
}

impl Segment {
    /// Create a segment
    #[must_use]
    pub fn new(language: Language, text: impl Into<String>) -> Self {
        Self {
            language,
            text: text.into(),
        }
    }

    /// Native-language segment
    #[must_use]
    pub fn native(text: impl Into<String>) -> Self {
        Self::new(Language::Native, text)
    }

    /// Foreign-language segment
    #[must_use]
    pub fn foreign(text: impl Into<String>) -> Self {
        Self::new(Language::Foreign, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_tag_language() {
        assert_eq!(Segment::native("hola").language, Language::Native);
        assert_eq!(Segment::foreign("hello").language, Language::Foreign);
    }

    #[test]
    fn serializes_as_object() {
        let json = serde_json::to_value(Segment::foreign("house")).expect("serialize");
        assert_eq!(json, serde_json::json!({"language": "foreign", "text": "house"}));
    }
}
