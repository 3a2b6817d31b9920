//! Property-based tests for the text pipeline and value objects
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{Language, LanguageCode, sanitize_for_speech, segment_bilingual};
use proptest::prelude::*;

fn without_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Annotated text whose foreign spans are all well formed
fn balanced_text() -> impl Strategy<Value = String> {
    let native = "[a-zA-Z0-9 ,.!?]{0,12}";
    let foreign = "[a-z]{1,6}( [a-z]{1,6})?";
    prop::collection::vec(
        prop_oneof![
            native.prop_map(|s| s),
            foreign.prop_map(|s| format!("**{s}**")),
        ],
        0..8,
    )
    .prop_map(|parts| parts.join(" "))
}

// ============================================================================
// Segmenter Property Tests
// ============================================================================

mod segmenter_tests {
    use super::*;

    proptest! {
        #[test]
        fn concatenation_reconstructs_source(input in balanced_text()) {
            let segments = segment_bilingual(&input);
            let joined: String = segments.iter().map(|s| s.text.as_str()).collect();
            prop_assert_eq!(
                without_whitespace(&joined),
                without_whitespace(&input.replace("**", ""))
            );
        }

        #[test]
        fn no_segment_is_empty(input in balanced_text()) {
            for segment in segment_bilingual(&input) {
                prop_assert!(!segment.text.trim().is_empty());
                prop_assert_eq!(segment.text.trim(), segment.text.as_str());
            }
        }

        #[test]
        fn foreign_text_comes_from_delimited_spans(
            word in "[a-z]{1,8}",
            before in "[A-Z][a-z]{0,8}",
        ) {
            let input = format!("{before} **{word}**");
            let segments = segment_bilingual(&input);
            prop_assert_eq!(segments.len(), 2);
            prop_assert_eq!(segments[0].language, Language::Native);
            prop_assert_eq!(segments[1].language, Language::Foreign);
            prop_assert_eq!(&segments[1].text, &word);
        }

        #[test]
        fn unbalanced_delimiters_never_panic(input in "[a-z *]{0,40}") {
            let _ = segment_bilingual(&input);
        }

        #[test]
        fn arbitrary_input_never_panics(input in any::<String>()) {
            let _ = segment_bilingual(&input);
        }

        #[test]
        fn output_is_markup_safe(input in any::<String>()) {
            for segment in segment_bilingual(&input) {
                prop_assert!(!segment.text.contains('<'));
                prop_assert!(!segment.text.contains('>'));
                prop_assert!(!segment.text.contains('"'));
            }
        }

        #[test]
        fn deterministic(input in any::<String>()) {
            prop_assert_eq!(segment_bilingual(&input), segment_bilingual(&input));
        }
    }
}

// ============================================================================
// Sanitizer Property Tests
// ============================================================================

mod sanitizer_tests {
    use super::*;

    proptest! {
        #[test]
        fn idempotent_on_arbitrary_text(input in any::<String>()) {
            let once = sanitize_for_speech(&input);
            prop_assert_eq!(sanitize_for_speech(&once), once);
        }

        #[test]
        fn idempotent_on_markdown_like_text(
            input in "[a-zw*#_`:/. \n]{0,60}|(https?://|www\\.)[a-z*_:/.]{0,20}"
        ) {
            let once = sanitize_for_speech(&input);
            prop_assert_eq!(sanitize_for_speech(&once), once);
        }

        #[test]
        fn output_has_no_structure_characters(input in any::<String>()) {
            let output = sanitize_for_speech(&input);
            prop_assert!(!output.contains('#'));
            prop_assert!(!output.contains('`'));
            prop_assert!(!output.contains('_'));
            prop_assert!(!output.contains(':'));
            prop_assert!(!output.contains("  "));
            prop_assert_eq!(output.trim(), output.as_str());
        }

        #[test]
        fn doubled_markers_survive(word in "[a-z]{1,10}") {
            let output = sanitize_for_speech(&format!("**{word}**"));
            prop_assert_eq!(output, format!("**{word}**"));
        }
    }
}

// ============================================================================
// LanguageCode Property Tests
// ============================================================================

mod language_code_tests {
    use super::*;

    proptest! {
        #[test]
        fn normalization_is_stable(raw in "[a-zA-Z]{2,3}([-_][a-zA-Z0-9]{1,8}){0,2}") {
            let code = LanguageCode::new(&raw).unwrap();
            let reparsed = LanguageCode::new(code.as_str()).unwrap();
            prop_assert_eq!(code, reparsed);
        }

        #[test]
        fn primary_is_lowercase_prefix(raw in "[a-zA-Z]{2,3}-[a-zA-Z]{2}") {
            let code = LanguageCode::new(&raw).unwrap();
            prop_assert_eq!(code.primary(), raw[..raw.find('-').unwrap()].to_ascii_lowercase());
        }
    }
}
