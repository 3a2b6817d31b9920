//! Synthesis requests and their wire form
//!
//! A request is either plain text read by one voice, or an SSML document
//! whose `<voice>` children switch between the native and foreign voices.

use domain::{Segment, VoiceProfile, VoiceVariant, escape_markup};
use serde::Serialize;

use crate::catalog::VoiceCatalog;
use crate::types::AudioFormat;

/// How a request is shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthesisMode {
    /// The whole text is read by one foreign voice
    SingleLanguage,
    /// Native and foreign spans are read by their own voices
    Bilingual,
}

/// A request for the synthesis endpoint, built fresh per call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisRequest {
    /// Plain text read by one voice
    PlainText {
        /// Sanitized text without language markers
        text: String,
        /// Voice reading the text
        voice: VoiceProfile,
    },
    /// SSML document with per-segment voices
    Markup {
        /// Complete `<speak>` document
        ssml: String,
        /// Document-level voice; must support voice switching
        base_voice: VoiceProfile,
    },
}

impl SynthesisRequest {
    /// The mode this request was built for
    #[must_use]
    pub const fn mode(&self) -> SynthesisMode {
        match self {
            Self::PlainText { .. } => SynthesisMode::SingleLanguage,
            Self::Markup { .. } => SynthesisMode::Bilingual,
        }
    }

    /// The document-level voice
    #[must_use]
    pub const fn voice(&self) -> &VoiceProfile {
        match self {
            Self::PlainText { voice, .. } => voice,
            Self::Markup { base_voice, .. } => base_voice,
        }
    }

    /// Length of the text or markup payload
    #[must_use]
    pub fn payload_len(&self) -> usize {
        match self {
            Self::PlainText { text, .. } => text.len(),
            Self::Markup { ssml, .. } => ssml.len(),
        }
    }

    /// JSON body for the endpoint
    #[must_use]
    pub fn to_body(&self, encoding: AudioFormat) -> RequestBody<'_> {
        let input = match self {
            Self::PlainText { text, .. } => Input::Text(text),
            Self::Markup { ssml, .. } => Input::Ssml(ssml),
        };
        let voice = self.voice();
        RequestBody {
            input,
            voice: VoiceSelection {
                language_code: voice.language_code.as_str(),
                name: &voice.voice_id,
            },
            audio_config: AudioConfig {
                audio_encoding: encoding.encoding_name(),
            },
        }
    }
}

/// JSON body sent to the synthesis endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody<'a> {
    #[serde(flatten)]
    input: Input<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Input<'a> {
    Text(&'a str),
    Ssml(&'a str),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

/// Render segments as an SSML document
///
/// Segment text is expected to be escaped already; voice attributes and the
/// rate are escaped here.
///
/// ```
/// use domain::{segment_bilingual, VoiceVariant};
/// use speech::{build_ssml, VoiceCatalog};
///
/// let segments = segment_bilingual("Se dice **hello**");
/// let ssml = build_ssml(&segments, &VoiceCatalog::default(), VoiceVariant::Female, "90%");
/// assert_eq!(
///     ssml,
///     concat!(
///         r#"<speak><voice languageCode="es-ES" name="es-ES-Neural2-A">Se dice</voice>"#,
///         r#"<voice languageCode="en-US" name="en-US-Neural2-F"><prosody rate="90%">hello</prosody></voice></speak>"#,
///     )
/// );
/// ```
#[must_use]
pub fn build_ssml(
    segments: &[Segment],
    catalog: &VoiceCatalog,
    variant: VoiceVariant,
    foreign_rate: &str,
) -> String {
    let mut ssml = String::from("<speak>");
    for segment in segments {
        let voice = catalog.resolve(segment.language, variant);
        ssml.push_str(&format!(
            r#"<voice languageCode="{}" name="{}">"#,
            escape_markup(voice.language_code.as_str()),
            escape_markup(&voice.voice_id)
        ));
        if segment.language.is_foreign() {
            ssml.push_str(&format!(
                r#"<prosody rate="{}">{}</prosody>"#,
                escape_markup(foreign_rate),
                segment.text
            ));
        } else {
            ssml.push_str(&segment.text);
        }
        ssml.push_str("</voice>");
    }
    ssml.push_str("</speak>");
    ssml
}
