//! Types for speech dispatch
//!
//! Contains data structures for audio data, formats, local voices and
//! utterances handed to the local engines.

use std::fmt;

use domain::{LanguageCode, VoiceVariant};
use serde::{Deserialize, Serialize};

/// Supported audio formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MP3 format (what the synthesis endpoint returns)
    #[default]
    Mp3,
    /// WAV format (what local engines write)
    Wav,
    /// OGG container
    Ogg,
}

impl AudioFormat {
    /// Get the MIME type for this audio format
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
        }
    }

    /// Get the file extension for this audio format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
        }
    }

    /// Name of the encoding in the synthesis request (`audioEncoding`)
    #[must_use]
    pub const fn encoding_name(&self) -> &'static str {
        match self {
            Self::Mp3 => "MP3",
            Self::Wav => "LINEAR16",
            Self::Ogg => "OGG_OPUS",
        }
    }

    /// Parse audio format from MIME type
    #[must_use]
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        // Handle compound MIME types like "audio/ogg; codecs=opus"
        let base_mime = mime.split(';').next().unwrap_or(mime).trim();

        match base_mime {
            "audio/mpeg" | "audio/mp3" => Some(Self::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/ogg" | "audio/opus" => Some(Self::Ogg),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Container for synthesized audio
#[derive(Debug, Clone)]
pub struct AudioData {
    /// Raw audio bytes
    data: Vec<u8>,
    /// Audio format
    format: AudioFormat,
}

impl AudioData {
    /// Create new audio data
    #[must_use]
    pub const fn new(data: Vec<u8>, format: AudioFormat) -> Self {
        Self { data, format }
    }

    /// Get the raw audio bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume and return the raw audio bytes
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Get the audio format
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    /// Get the size of the audio data in bytes
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Check if the audio data is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A voice offered by a local engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Identifier passed back to the engine
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Language tags the voice speaks (`en-US`, `es`)
    pub languages: Vec<String>,
    /// Voice gender (if known)
    pub gender: Option<VoiceVariant>,
}

impl VoiceInfo {
    /// Create a new voice info
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            languages: Vec::new(),
            gender: None,
        }
    }

    /// Add a language tag
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    /// Set the gender
    #[must_use]
    pub const fn with_gender(mut self, gender: VoiceVariant) -> Self {
        self.gender = Some(gender);
        self
    }

    /// How well this voice fits the requested language
    #[must_use]
    pub fn language_match(&self, language: &LanguageCode) -> LanguageMatch {
        self.languages
            .iter()
            .filter_map(|tag| LanguageCode::new(tag).ok())
            .map(|tag| {
                if &tag == language {
                    LanguageMatch::Exact
                } else if tag.same_language(language) {
                    LanguageMatch::Primary
                } else {
                    LanguageMatch::None
                }
            })
            .max()
            .unwrap_or(LanguageMatch::None)
    }
}

/// Quality of a voice/language match, ordered worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LanguageMatch {
    /// Different language
    None,
    /// Same two-letter language, different region
    Primary,
    /// Same tag
    Exact,
}

/// Pick the best local voice for a language
///
/// An exact tag beats a primary-subtag match; among equals the engine's
/// listing order wins. Returns `None` when no voice speaks the language, in
/// which case the engine default is used.
#[must_use]
pub fn select_voice<'a>(voices: &'a [VoiceInfo], language: &LanguageCode) -> Option<&'a VoiceInfo> {
    let mut best: Option<(&VoiceInfo, LanguageMatch)> = None;
    for voice in voices {
        let quality = voice.language_match(language);
        if quality == LanguageMatch::None {
            continue;
        }
        if best.is_none_or(|(_, current)| quality > current) {
            best = Some((voice, quality));
        }
    }
    best.map(|(voice, _)| voice)
}

/// One request to a local engine
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Plain text to speak
    pub text: String,
    /// Language of the text
    pub lang: LanguageCode,
    /// Speaking rate, 1.0 is the engine's normal speed
    pub rate: f32,
    /// Engine voice id; `None` uses the engine default
    pub voice: Option<String>,
}

impl Utterance {
    /// Create an utterance at normal speed with the default voice
    #[must_use]
    pub fn new(text: impl Into<String>, lang: LanguageCode) -> Self {
        Self {
            text: text.into(),
            lang,
            rate: 1.0,
            voice: None,
        }
    }

    /// Set the speaking rate
    #[must_use]
    pub const fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    /// Set the engine voice
    #[must_use]
    pub fn with_voice(mut self, voice: Option<String>) -> Self {
        self.voice = voice;
        self
    }
}
