//! Piper local speech provider
//!
//! Implements `LocalSynthesis` using the Piper CLI.
//!
//! # Prerequisites
//!
//! - Piper must be installed and available in PATH
//! - One voice model (.onnx) and config (.json) per language
//!
//! ```bash
//! mkdir -p ~/.local/share/piper/voices
//! cd ~/.local/share/piper/voices
//! wget https://huggingface.co/rhasspy/piper-voices/resolve/main/es/es_ES/davefx/medium/es_ES-davefx-medium.onnx
//! wget https://huggingface.co/rhasspy/piper-voices/resolve/main/es/es_ES/davefx/medium/es_ES-davefx-medium.onnx.json
//! ```
//!
//! Voice names follow Piper's `<locale>-<speaker>-<quality>` convention so the
//! language can be read off the name.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, instrument, warn};

use crate::config::LocalTtsConfig;
use crate::error::SpeechError;
use crate::ports::LocalSynthesis;
use crate::types::{AudioData, AudioFormat, Utterance, VoiceInfo};

/// Local TTS provider using Piper
#[derive(Debug, Clone)]
pub struct PiperProvider {
    config: LocalTtsConfig,
}

impl PiperProvider {
    /// Create a new Piper provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(config: LocalTtsConfig) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;
        Ok(Self { config })
    }

    fn executable(&self) -> &Path {
        &self.config.executable_path
    }

    /// Get the voice model path for a voice name
    fn voice_model_path(&self, voice: Option<&str>) -> &Path {
        let voice_name = voice.unwrap_or(&self.config.default_voice);

        self.config
            .voices
            .get(voice_name)
            .map_or(&self.config.default_model_path, PathBuf::as_path)
    }

    /// Length scale for a relative rate; Piper slows down as the scale grows
    fn length_scale(&self, rate: f32) -> f32 {
        if rate <= 0.0 {
            return self.config.length_scale;
        }
        self.config.length_scale / rate
    }

    fn command(&self, model: &Path, output: &Path, rate: f32) -> Command {
        let mut cmd = Command::new(self.executable());
        cmd.arg("--model")
            .arg(model)
            .arg("--output_file")
            .arg(output)
            .arg("--length_scale")
            .arg(self.length_scale(rate).to_string())
            .arg("--sentence_silence")
            .arg(self.config.sentence_silence.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn spawn_error(&self, err: &std::io::Error) -> SpeechError {
        if err.kind() == std::io::ErrorKind::NotFound {
            SpeechError::NotAvailable(format!(
                "Piper not found at '{}'",
                self.executable().display()
            ))
        } else {
            SpeechError::SynthesisFailed(format!("Failed to run piper: {err}"))
        }
    }

    /// Speak `utterance` into a temporary WAV file and read it back
    #[instrument(skip_all, fields(voice = ?utterance.voice, text_len = utterance.text.len()))]
    async fn render(&self, utterance: &Utterance) -> Result<Vec<u8>, SpeechError> {
        let wav_file = NamedTempFile::with_suffix(".wav").map_err(|e| {
            SpeechError::SynthesisFailed(format!("Failed to create temp file: {e}"))
        })?;
        let model = self.voice_model_path(utterance.voice.as_deref());

        let mut child = self
            .command(model, wav_file.path(), utterance.rate)
            .spawn()
            .map_err(|e| self.spawn_error(&e))?;
        debug!(model = %model.display(), "Piper started");

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(utterance.text.as_bytes()).await.map_err(|e| {
                SpeechError::SynthesisFailed(format!("Failed to write to piper stdin: {e}"))
            })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SpeechError::SynthesisFailed(format!("Failed to wait for piper: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!(status = %output.status, "Piper failed: {}", stderr.trim());
            return Err(SpeechError::SynthesisFailed(format!(
                "Piper exited with status {}",
                output.status
            )));
        }

        let wav = tokio::fs::read(wav_file.path()).await.map_err(|e| {
            SpeechError::SynthesisFailed(format!("Failed to read piper output: {e}"))
        })?;
        if wav.is_empty() {
            warn!("Piper produced empty output");
            return Err(SpeechError::SynthesisFailed(
                "Piper produced empty output".to_string(),
            ));
        }
        Ok(wav)
    }
}

/// Describe a configured voice from its `<locale>-<speaker>-<quality>` name
fn voice_info(name: &str) -> VoiceInfo {
    let mut parts = name.split('-');
    let locale = parts.next().unwrap_or(name);
    let speaker = parts.next().unwrap_or("default");
    VoiceInfo::new(name, format!("{speaker} ({locale})")).with_language(locale.replace('_', "-"))
}

#[async_trait]
impl LocalSynthesis for PiperProvider {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        let mut names: Vec<&String> = self.config.voices.keys().collect();
        names.sort();
        let mut voices: Vec<VoiceInfo> = names.into_iter().map(|name| voice_info(name)).collect();

        if !voices.iter().any(|v| v.id == self.config.default_voice) {
            voices.push(voice_info(&self.config.default_voice));
        }

        Ok(voices)
    }

    #[instrument(skip(self, utterance), fields(lang = %utterance.lang))]
    async fn synthesize(&self, utterance: &Utterance) -> Result<AudioData, SpeechError> {
        if utterance.text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Cannot synthesize empty text".to_string(),
            ));
        }

        let wav = self.render(utterance).await?;
        Ok(AudioData::new(wav, AudioFormat::Wav))
    }

    async fn is_available(&self) -> bool {
        if !self.config.default_model_path.exists() {
            debug!(model = %self.config.default_model_path.display(), "Piper model missing");
            return false;
        }
        self.executable().exists()
            || Command::new(self.executable())
                .arg("--help")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .is_ok_and(|status| status.success())
    }

    fn engine_name(&self) -> &str {
        "piper"
    }
}
