//! Voice catalog
//!
//! Static lookup from (language side, voice variant) to a provider voice.
//! Lookups never fail: a missing entry degrades to the other variant of the
//! same language, then to the catalog's fallback profile.

use domain::{Language, LanguageCode, VoiceProfile, VoiceVariant};
use serde::{Deserialize, Serialize};

/// The voices configured for one language side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct VoiceSet {
    /// Female voice
    #[serde(default)]
    pub female: Option<VoiceProfile>,
    /// Male voice
    #[serde(default)]
    pub male: Option<VoiceProfile>,
}

impl VoiceSet {
    /// Create a set with both variants
    #[must_use]
    pub const fn new(female: VoiceProfile, male: VoiceProfile) -> Self {
        Self {
            female: Some(female),
            male: Some(male),
        }
    }

    /// Get the voice for a variant, if configured
    #[must_use]
    pub const fn get(&self, variant: VoiceVariant) -> Option<&VoiceProfile> {
        match variant {
            VoiceVariant::Female => self.female.as_ref(),
            VoiceVariant::Male => self.male.as_ref(),
        }
    }

    fn any(&self) -> Option<&VoiceProfile> {
        self.female.as_ref().or(self.male.as_ref())
    }

    fn iter(&self) -> impl Iterator<Item = &VoiceProfile> {
        self.female.iter().chain(self.male.iter())
    }
}

/// Voice lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCatalog {
    /// Voices reading the learner's language
    #[serde(default = "default_native_voices")]
    pub native: VoiceSet,
    /// Voices reading the studied language
    #[serde(default = "default_foreign_voices")]
    pub foreign: VoiceSet,
    /// Used when neither variant of a language is configured
    #[serde(default = "default_fallback_voice")]
    pub fallback: VoiceProfile,
}

fn profile(code: &str, voice_id: &str, variant: VoiceVariant) -> VoiceProfile {
    #[allow(clippy::expect_used)] // Static tag
    let language_code = LanguageCode::new(code).expect("valid built-in language tag");
    VoiceProfile::new(language_code, voice_id, variant)
}

fn default_native_voices() -> VoiceSet {
    VoiceSet::new(
        profile("es-ES", "es-ES-Neural2-A", VoiceVariant::Female),
        profile("es-ES", "es-ES-Neural2-B", VoiceVariant::Male),
    )
}

fn default_foreign_voices() -> VoiceSet {
    VoiceSet::new(
        profile("en-US", "en-US-Neural2-F", VoiceVariant::Female),
        profile("en-US", "en-US-Neural2-D", VoiceVariant::Male),
    )
}

fn default_fallback_voice() -> VoiceProfile {
    profile("es-ES", "es-ES-Neural2-A", VoiceVariant::Female)
}

impl Default for VoiceCatalog {
    fn default() -> Self {
        Self {
            native: default_native_voices(),
            foreign: default_foreign_voices(),
            fallback: default_fallback_voice(),
        }
    }
}

impl VoiceCatalog {
    /// Get the voice set for a language side
    #[must_use]
    pub const fn voices(&self, language: Language) -> &VoiceSet {
        match language {
            Language::Native => &self.native,
            Language::Foreign => &self.foreign,
        }
    }

    /// Resolve the voice for a language side and variant
    ///
    /// ```
    /// use domain::{Language, VoiceVariant};
    /// use speech::VoiceCatalog;
    ///
    /// let catalog = VoiceCatalog::default();
    /// let voice = catalog.resolve(Language::Foreign, VoiceVariant::Male);
    /// assert_eq!(voice.voice_id, "en-US-Neural2-D");
    /// ```
    #[must_use]
    pub fn resolve(&self, language: Language, variant: VoiceVariant) -> &VoiceProfile {
        let set = self.voices(language);
        set.get(variant)
            .or_else(|| set.any())
            .unwrap_or(&self.fallback)
    }

    /// Check the configuration invariants
    ///
    /// The native voice hosts the SSML document in bilingual mode, so every
    /// voice that can end up there must accept nested voice tags. A legacy
    /// base voice would silently read all segments with one voice.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated invariant.
    pub fn validate(&self) -> Result<(), String> {
        for variant in VoiceVariant::all() {
            let base = self.resolve(Language::Native, variant);
            if !base.supports_voice_switching() {
                return Err(format!(
                    "Base voice {} cannot host per-segment voice tags; use a Neural2 or WaveNet voice",
                    base.voice_id
                ));
            }
        }

        for voice in self.native.iter().chain(self.foreign.iter()) {
            if voice.voice_id.trim().is_empty() {
                return Err(format!("Voice for {} has an empty name", voice.language_code));
            }
        }

        Ok(())
    }
}
