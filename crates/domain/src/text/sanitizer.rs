//! Speech sanitizer
//!
//! Removes what a speech engine would otherwise read aloud literally:
//! emoji, links and markdown structure. Doubled `**` markers survive because
//! the segmenter needs them to switch voices.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::segmenter::DELIMITER;

/// Emoji, pictographs, dingbats and the joiners/selectors that glue them
static EMOJI: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Static pattern
    Regex::new(concat!(
        r"[\x{1F000}-\x{1FAFF}",
        r"\x{2600}-\x{27BF}",
        r"\x{2B00}-\x{2BFF}",
        r"\x{2300}-\x{23FF}",
        r"\x{FE00}-\x{FE0F}",
        r"\x{200D}\x{20E3}",
        r"\x{E0020}-\x{E007F}]",
    ))
    .expect("valid emoji pattern")
});

static MARKDOWN_STRUCTURE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Static pattern
    Regex::new(r"[#`_]").expect("valid markdown pattern")
});

static ASTERISKS: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Static pattern
    Regex::new(r"\*+").expect("valid asterisk pattern")
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Static pattern
    Regex::new(r"(?i)(?:https?://|www\.)\S+").expect("valid url pattern")
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Static pattern
    Regex::new(r"\s+").expect("valid whitespace pattern")
});

/// Clean text before it is handed to a speech engine
///
/// Idempotent: sanitizing already sanitized text returns it unchanged.
///
/// ```
/// use domain::sanitize_for_speech;
///
/// assert_eq!(
///     sanitize_for_speech("## Nota: lee *esto* y **this** 🎉 https://example.com"),
///     "Nota, lee esto y **this**"
/// );
/// ```
#[must_use]
pub fn sanitize_for_speech(text: &str) -> String {
    // Order matters: every removal that could join characters into a link
    // runs before links are stripped, and colons go last so no `://` survives.
    let text = EMOJI.replace_all(text, "");
    let text = MARKDOWN_STRUCTURE.replace_all(&text, "");
    let text = ASTERISKS.replace_all(&text, |caps: &Captures<'_>| {
        if caps[0].len() == 1 { "" } else { DELIMITER }
    });
    let text = URL.replace_all(&text, "");
    let text = text.replace(':', ", ");
    collapse_whitespace(&text)
}

/// Sanitized text with the language markers removed
///
/// Used wherever voices cannot be switched mid-utterance: single-language
/// requests and the local fallback engine.
///
/// ```
/// use domain::plain_text_for_speech;
///
/// assert_eq!(plain_text_for_speech("Di **good morning**: ya"), "Di good morning, ya");
/// ```
#[must_use]
pub fn plain_text_for_speech(text: &str) -> String {
    collapse_whitespace(&sanitize_for_speech(text).replace(DELIMITER, ""))
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emoji() {
        assert_eq!(sanitize_for_speech("Muy bien 👍🏽!"), "Muy bien !");
        assert_eq!(sanitize_for_speech("✅ Correcto"), "Correcto");
        assert_eq!(sanitize_for_speech("🇬🇧 English"), "English");
    }

    #[test]
    fn strips_urls() {
        assert_eq!(
            sanitize_for_speech("Mira https://dict.example.org/house?x=1 ahora"),
            "Mira ahora"
        );
        assert_eq!(sanitize_for_speech("o www.example.com"), "o");
    }

    #[test]
    fn strips_markdown_structure() {
        assert_eq!(sanitize_for_speech("### `code` __bold__"), "code bold");
    }

    #[test]
    fn strips_single_asterisks_keeps_double() {
        assert_eq!(sanitize_for_speech("*énfasis* y **word**"), "énfasis y **word**");
        assert_eq!(sanitize_for_speech("***word***"), "**word**");
    }

    #[test]
    fn replaces_colons() {
        assert_eq!(sanitize_for_speech("Ejemplo: hola"), "Ejemplo, hola");
        assert_eq!(sanitize_for_speech("a:b"), "a, b");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sanitize_for_speech("  uno \n\n dos\t tres  "), "uno dos tres");
    }

    #[test]
    fn is_idempotent_on_examples() {
        let inputs = [
            "## Nota: lee *esto* y **this** 🎉 https://example.com",
            "ht_tps://hidden.example",
            "ht*tps://hidden.example",
            "wwwww.example.com",
            "https:// spaced",
            "**a**:**b**",
            "",
        ];
        for input in inputs {
            let once = sanitize_for_speech(input);
            assert_eq!(sanitize_for_speech(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn plain_text_drops_markers() {
        assert_eq!(plain_text_for_speech("La palabra es **house**."), "La palabra es house.");
        assert_eq!(plain_text_for_speech("****"), "");
    }

    #[test]
    fn plain_text_keeps_words_and_tokens_intact() {
        assert_eq!(plain_text_for_speech("Los **cat**s duermen"), "Los cats duermen");
        assert_eq!(plain_text_for_speech("Usa .NET y **C#**"), "Usa .NET y C");
        assert_eq!(plain_text_for_speech("uno , dos"), "uno , dos");
    }
}
