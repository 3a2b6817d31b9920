//! Voice profile value object
//!
//! Identifies one provider voice: its language, its name and the tier it
//! belongs to.
//!
//! # Examples
//!
//! ```
//! use domain::{LanguageCode, VoiceProfile, VoiceTier, VoiceVariant};
//!
//! let profile = VoiceProfile::new(
//!     LanguageCode::new("en-US").unwrap(),
//!     "en-US-Neural2-F",
//!     VoiceVariant::Female,
//! );
//! assert_eq!(profile.tier, VoiceTier::Neural2);
//! assert!(profile.supports_voice_switching());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{LanguageCode, VoiceVariant};

/// Quality tier of a provider voice
///
/// Only the newer tiers accept `<voice>` elements nested in an SSML
/// document; a legacy base voice silently ignores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceTier {
    /// Legacy concatenative voices
    Standard,
    /// WaveNet voices
    Wavenet,
    /// Neural2 voices
    #[default]
    Neural2,
}

impl VoiceTier {
    /// Infer the tier from a provider voice name such as `en-US-Neural2-F`
    #[must_use]
    pub fn from_voice_id(voice_id: &str) -> Self {
        let lower = voice_id.to_ascii_lowercase();
        if lower.contains("neural2") {
            Self::Neural2
        } else if lower.contains("wavenet") {
            Self::Wavenet
        } else {
            Self::Standard
        }
    }

    /// Whether a document-level voice of this tier honours nested voice tags
    #[must_use]
    pub const fn supports_voice_switching(&self) -> bool {
        matches!(self, Self::Wavenet | Self::Neural2)
    }
}

/// A provider voice
///
/// When deserialized without an explicit `tier`, the tier is inferred from
/// the voice name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "VoiceProfileRepr")]
pub struct VoiceProfile {
    /// Language the voice speaks
    pub language_code: LanguageCode,
    /// Provider voice name
    pub voice_id: String,
    /// Gender variant
    pub variant: VoiceVariant,
    /// Voice tier
    pub tier: VoiceTier,
}

#[derive(Deserialize)]
struct VoiceProfileRepr {
    language_code: LanguageCode,
    voice_id: String,
    variant: VoiceVariant,
    #[serde(default)]
    tier: Option<VoiceTier>,
}

impl From<VoiceProfileRepr> for VoiceProfile {
    fn from(repr: VoiceProfileRepr) -> Self {
        let profile = Self::new(repr.language_code, repr.voice_id, repr.variant);
        match repr.tier {
            Some(tier) => profile.with_tier(tier),
            None => profile,
        }
    }
}

impl VoiceProfile {
    /// Create a profile, inferring the tier from the voice name
    #[must_use]
    pub fn new(language_code: LanguageCode, voice_id: impl Into<String>, variant: VoiceVariant) -> Self {
        let voice_id = voice_id.into();
        let tier = VoiceTier::from_voice_id(&voice_id);
        Self {
            language_code,
            voice_id,
            variant,
            tier,
        }
    }

    /// Override the inferred tier
    #[must_use]
    pub const fn with_tier(mut self, tier: VoiceTier) -> Self {
        self.tier = tier;
        self
    }

    /// Whether this voice can host nested per-segment voice tags
    #[must_use]
    pub const fn supports_voice_switching(&self) -> bool {
        self.tier.supports_voice_switching()
    }
}

impl fmt::Display for VoiceProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.voice_id, self.language_code, self.variant)
    }
}
