//! Bilingual segmenter
//!
//! Text wrapped in `**` is read by the foreign-language voice, everything
//! else by the native voice:
//!
//! ```text
//! "La palabra es **house**."
//!   -> [native "La palabra es", foreign "house."]
//! ```
//!
//! Unmatched delimiters stay in the text as literal characters. Pieces that
//! carry no letters or digits (a trailing full stop, an opening `¿`) are
//! glued to their neighbour instead of being spoken on their own.

use std::sync::LazyLock;

use regex::Regex;

use super::escape::escape_markup;
use crate::value_objects::{Language, Segment};

/// The doubled delimiter marking foreign-language spans
pub const DELIMITER: &str = "**";

/// Runs of three or more asterisks collapse to the canonical delimiter
static DELIMITER_RUN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Static pattern
    Regex::new(r"\*{3,}").expect("valid delimiter run pattern")
});

/// A delimited span; the capture is the foreign text
static DELIMITED_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Static pattern
    Regex::new(r"(?s)\*\*(.+?)\*\*").expect("valid delimited span pattern")
});

/// Split annotated text into language-tagged segments
///
/// Segment text is trimmed and markup-escaped. Segments that end up empty
/// are dropped, so text made only of delimiters yields no segments.
///
/// ```
/// use domain::{segment_bilingual, Segment};
///
/// assert_eq!(
///     segment_bilingual("La palabra es **house**."),
///     vec![Segment::native("La palabra es"), Segment::foreign("house.")]
/// );
/// assert!(segment_bilingual("****").is_empty());
/// ```
#[must_use]
pub fn segment_bilingual(text: &str) -> Vec<Segment> {
    let normalized = DELIMITER_RUN.replace_all(text, DELIMITER);

    let mut builder = SegmentBuilder::default();
    let mut cursor = 0;

    for captures in DELIMITED_SPAN.captures_iter(&normalized) {
        let (Some(span), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };
        builder.push(Language::Native, &normalized[cursor..span.start()]);
        builder.push(Language::Foreign, inner.as_str());
        cursor = span.end();
    }
    builder.push(Language::Native, &normalized[cursor..]);

    builder.finish()
}

/// Accumulates split pieces, merging punctuation-only pieces into neighbours
#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
    /// Punctuation seen before the first spoken segment
    prefix: String,
    /// Whether whitespace separated `prefix` from what follows
    prefix_spaced: bool,
}

impl SegmentBuilder {
    fn push(&mut self, language: Language, piece: &str) {
        let text = piece.trim();
        if text.is_empty() || text.chars().all(|c| c == '*' || c.is_whitespace()) {
            return;
        }

        let escaped = escape_markup(text);

        if !text.chars().any(char::is_alphanumeric) {
            if let Some(last) = self.segments.last_mut() {
                if piece.starts_with(char::is_whitespace) {
                    last.text.push(' ');
                }
                last.text.push_str(&escaped);
            } else {
                if !self.prefix.is_empty() && (self.prefix_spaced || piece.starts_with(char::is_whitespace)) {
                    self.prefix.push(' ');
                }
                self.prefix.push_str(&escaped);
                self.prefix_spaced = piece.ends_with(char::is_whitespace);
            }
            return;
        }

        let mut content = std::mem::take(&mut self.prefix);
        if !content.is_empty() && (self.prefix_spaced || piece.starts_with(char::is_whitespace)) {
            content.push(' ');
        }
        content.push_str(&escaped);
        self.segments.push(Segment::new(language, content));
    }

    fn finish(mut self) -> Vec<Segment> {
        // Nothing but punctuation: keep it rather than lose text
        if self.segments.is_empty() && !self.prefix.is_empty() {
            self.segments.push(Segment::native(self.prefix));
        }
        self.segments
    }
}
