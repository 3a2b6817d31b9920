//! Configuration for speech dispatch

use std::collections::HashMap;
use std::path::PathBuf;

use domain::LanguageCode;
use serde::{Deserialize, Serialize};

use crate::catalog::VoiceCatalog;
use crate::types::AudioFormat;

/// Configuration for speech dispatch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Which synthesis endpoint to talk to
    #[serde(default)]
    pub environment: SpeechEnvironment,

    /// Endpoint used during local development
    #[serde(default = "default_local_endpoint")]
    pub local_endpoint: String,

    /// Endpoint used when deployed
    #[serde(default)]
    pub deployed_endpoint: Option<String>,

    /// API key, sent as the `key` query parameter when present
    #[serde(default)]
    pub api_key: Option<String>,

    /// The learner's language; text outside `**` spans is read in it
    #[serde(default = "default_native_language")]
    pub native_language: LanguageCode,

    /// The studied language; a request for this code is read with one voice
    #[serde(default = "default_foreign_language")]
    pub foreign_language: LanguageCode,

    /// Voice lookup table
    #[serde(default)]
    pub voices: VoiceCatalog,

    /// Prosody rate applied to foreign segments (`90%`, `slow`)
    #[serde(default = "default_foreign_rate")]
    pub foreign_rate: String,

    /// Request timeout in milliseconds; unset leaves the transport default
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Encoding requested from the endpoint
    #[serde(default)]
    pub audio_encoding: AudioFormat,

    /// Local synthesis used when the endpoint fails
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// External audio player
    #[serde(default)]
    pub player: PlayerConfig,
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEnvironment {
    /// Local development proxy
    #[default]
    Local,
    /// Deployed proxy
    Deployed,
}

/// Local engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocalEngine {
    /// espeak-ng
    #[default]
    Espeak,
    /// Piper neural TTS
    Piper,
}

/// Fallback synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Engine to use
    #[serde(default)]
    pub engine: LocalEngine,

    /// Speaking rate relative to the engine's normal speed
    #[serde(default = "default_fallback_rate")]
    pub rate: f32,

    /// Delay before listing voices a second time when the first listing is empty
    #[serde(default = "default_voice_retry_delay_ms")]
    pub voice_retry_delay_ms: u64,

    /// espeak-ng settings
    #[serde(default)]
    pub espeak: EspeakConfig,

    /// Piper settings, required when `engine = "piper"`
    #[serde(default)]
    pub piper: Option<LocalTtsConfig>,
}

/// espeak-ng settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EspeakConfig {
    /// Path to the `espeak-ng` executable
    #[serde(default = "default_espeak_path")]
    pub executable_path: PathBuf,

    /// Words per minute at rate 1.0
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

/// Piper settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalTtsConfig {
    /// Path to the `piper` executable
    #[serde(default = "default_piper_path")]
    pub executable_path: PathBuf,

    /// Model used when no configured voice matches
    pub default_model_path: PathBuf,

    /// Name of the default voice
    #[serde(default = "default_piper_voice")]
    pub default_voice: String,

    /// Voice name (`es_ES-davefx-medium`) to model path
    #[serde(default)]
    pub voices: HashMap<String, PathBuf>,

    /// Phoneme length scale at rate 1.0; larger is slower
    #[serde(default = "default_length_scale")]
    pub length_scale: f32,

    /// Seconds of silence after each sentence
    #[serde(default = "default_sentence_silence")]
    pub sentence_silence: f32,
}

/// External player settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Player executable
    #[serde(default = "default_player_command")]
    pub command: String,

    /// Arguments; the audio is written to the player's stdin
    #[serde(default = "default_player_args")]
    pub args: Vec<String>,
}

fn default_local_endpoint() -> String {
    "http://localhost:8888/api/tts".to_string()
}

#[allow(clippy::expect_used)] // Static tag
fn default_native_language() -> LanguageCode {
    LanguageCode::new("es-ES").expect("valid built-in language tag")
}

#[allow(clippy::expect_used)] // Static tag
fn default_foreign_language() -> LanguageCode {
    LanguageCode::new("en-US").expect("valid built-in language tag")
}

fn default_foreign_rate() -> String {
    "90%".to_string()
}

const fn default_fallback_rate() -> f32 {
    0.9
}

const fn default_voice_retry_delay_ms() -> u64 {
    250
}

fn default_espeak_path() -> PathBuf {
    PathBuf::from("espeak-ng")
}

const fn default_words_per_minute() -> u32 {
    175
}

fn default_piper_path() -> PathBuf {
    PathBuf::from("piper")
}

fn default_piper_voice() -> String {
    "default".to_string()
}

const fn default_length_scale() -> f32 {
    1.0
}

const fn default_sentence_silence() -> f32 {
    0.2
}

fn default_player_command() -> String {
    "ffplay".to_string()
}

fn default_player_args() -> Vec<String> {
    ["-nodisp", "-autoexit", "-loglevel", "error", "-i", "pipe:0"]
        .into_iter()
        .map(String::from)
        .collect()
}

const RATE_KEYWORDS: [&str; 6] = ["x-slow", "slow", "medium", "fast", "x-fast", "default"];

/// Check a prosody rate: a keyword or a percentage between 20% and 200%
fn validate_rate(rate: &str) -> Result<(), String> {
    if RATE_KEYWORDS.contains(&rate) {
        return Ok(());
    }
    let percent = rate
        .strip_suffix('%')
        .and_then(|n| n.parse::<u32>().ok())
        .ok_or_else(|| format!("Foreign rate must be a percentage or keyword, got '{rate}'"))?;
    if !(20..=200).contains(&percent) {
        return Err(format!(
            "Foreign rate must be between 20% and 200%, got {percent}%"
        ));
    }
    Ok(())
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            environment: SpeechEnvironment::default(),
            local_endpoint: default_local_endpoint(),
            deployed_endpoint: None,
            api_key: None,
            native_language: default_native_language(),
            foreign_language: default_foreign_language(),
            voices: VoiceCatalog::default(),
            foreign_rate: default_foreign_rate(),
            timeout_ms: None,
            audio_encoding: AudioFormat::default(),
            fallback: FallbackConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            engine: LocalEngine::default(),
            rate: default_fallback_rate(),
            voice_retry_delay_ms: default_voice_retry_delay_ms(),
            espeak: EspeakConfig::default(),
            piper: None,
        }
    }
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            executable_path: default_espeak_path(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: default_player_args(),
        }
    }
}

impl LocalTtsConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_model_path.as_os_str().is_empty() {
            return Err("Piper default model path must be set".to_string());
        }
        if !(0.1..=5.0).contains(&self.length_scale) {
            return Err(format!(
                "Piper length scale must be between 0.1 and 5.0, got {}",
                self.length_scale
            ));
        }
        if self.sentence_silence < 0.0 {
            return Err("Piper sentence silence must not be negative".to_string());
        }
        Ok(())
    }
}

impl SpeechConfig {
    /// The synthesis endpoint for the configured environment
    ///
    /// # Errors
    ///
    /// Returns an error if the deployed environment has no endpoint.
    pub fn endpoint(&self) -> Result<&str, String> {
        match self.environment {
            SpeechEnvironment::Local => Ok(&self.local_endpoint),
            SpeechEnvironment::Deployed => self
                .deployed_endpoint
                .as_deref()
                .ok_or_else(|| "Deployed environment requires deployed_endpoint".to_string()),
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        let endpoint = self.endpoint()?;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(format!("Endpoint must be an http(s) URL, got '{endpoint}'"));
        }

        if self.native_language.same_language(&self.foreign_language) {
            return Err(format!(
                "Native and foreign language must differ, both are '{}'",
                self.native_language.primary()
            ));
        }

        validate_rate(&self.foreign_rate)?;

        if self.timeout_ms == Some(0) {
            return Err("Timeout must be greater than 0".to_string());
        }

        self.voices.validate()?;

        if !(0.1..=3.0).contains(&self.fallback.rate) {
            return Err(format!(
                "Fallback rate must be between 0.1 and 3.0, got {}",
                self.fallback.rate
            ));
        }

        match (&self.fallback.engine, &self.fallback.piper) {
            (LocalEngine::Piper, None) => {
                return Err("Piper engine selected but [fallback.piper] is missing".to_string());
            },
            (LocalEngine::Piper, Some(piper)) => piper.validate()?,
            (LocalEngine::Espeak, _) => {},
        }

        if self.player.command.trim().is_empty() {
            return Err("Player command must not be empty".to_string());
        }

        Ok(())
    }
}
