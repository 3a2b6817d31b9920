//! espeak-ng local speech provider
//!
//! Implements `LocalSynthesis` by running `espeak-ng` as a subprocess. The
//! text goes in on stdin and the WAV comes back on stdout.
//!
//! # Installation
//!
//! ```bash
//! sudo apt install espeak-ng
//! espeak-ng --voices=es
//! ```

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use domain::VoiceVariant;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, instrument};

use crate::config::EspeakConfig;
use crate::error::SpeechError;
use crate::ports::LocalSynthesis;
use crate::types::{AudioData, AudioFormat, Utterance, VoiceInfo};

const MIN_WORDS_PER_MINUTE: f32 = 80.0;
const MAX_WORDS_PER_MINUTE: f32 = 450.0;

/// Local TTS provider using espeak-ng
#[derive(Debug, Clone)]
pub struct EspeakProvider {
    config: EspeakConfig,
}

impl EspeakProvider {
    /// Create a new espeak-ng provider
    #[must_use]
    pub const fn new(config: EspeakConfig) -> Self {
        Self { config }
    }

    fn executable(&self) -> &Path {
        &self.config.executable_path
    }

    /// Words per minute for a relative rate
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn words_per_minute(&self, rate: f32) -> u32 {
        let wpm = self.config.words_per_minute as f32 * rate;
        wpm.clamp(MIN_WORDS_PER_MINUTE, MAX_WORDS_PER_MINUTE).round() as u32
    }

    fn spawn_error(&self, e: &std::io::Error) -> SpeechError {
        if e.kind() == std::io::ErrorKind::NotFound {
            SpeechError::NotAvailable(format!(
                "espeak-ng not found at '{}'. Please install espeak-ng.",
                self.executable().display()
            ))
        } else {
            SpeechError::SynthesisFailed(format!("Failed to run espeak-ng: {e}"))
        }
    }
}

/// Parse the table printed by `espeak-ng --voices`
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File          Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US     (en 10)
/// ```
pub(crate) fn parse_voice_list(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("Pty"))
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let _priority = columns.next()?;
            let language = columns.next()?;
            let age_gender = columns.next()?;
            let name = columns.next()?;

            let voice = VoiceInfo::new(language, name.replace('_', " ")).with_language(language);
            Some(match age_gender.rsplit('/').next() {
                Some("M") => voice.with_gender(VoiceVariant::Male),
                Some("F") => voice.with_gender(VoiceVariant::Female),
                _ => voice,
            })
        })
        .collect()
}

#[async_trait]
impl LocalSynthesis for EspeakProvider {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        let output = Command::new(self.executable())
            .arg("--voices")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(&e))?;

        if !output.status.success() {
            return Err(SpeechError::SynthesisFailed(format!(
                "espeak-ng --voices exited with status {}",
                output.status
            )));
        }

        let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
        debug!(count = voices.len(), "Listed espeak-ng voices");
        Ok(voices)
    }

    #[instrument(
        skip(self, utterance),
        fields(lang = %utterance.lang, voice = ?utterance.voice, text_len = utterance.text.len())
    )]
    async fn synthesize(&self, utterance: &Utterance) -> Result<AudioData, SpeechError> {
        if utterance.text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Cannot synthesize empty text".to_string(),
            ));
        }

        let voice = utterance
            .voice
            .clone()
            .unwrap_or_else(|| utterance.lang.primary().to_string());

        let mut cmd = Command::new(self.executable());
        cmd.arg("--stdout")
            .arg("--stdin")
            .arg("-v")
            .arg(&voice)
            .arg("-s")
            .arg(self.words_per_minute(utterance.rate).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Running espeak-ng: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| self.spawn_error(&e))?;

        // Feed stdin while stdout drains so long texts cannot fill both pipes
        let stdin = child.stdin.take();
        let text = utterance.text.as_bytes();
        let feed = async move {
            match stdin {
                Some(mut stdin) => stdin.write_all(text).await,
                None => Ok(()),
            }
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());

        let output = output.map_err(|e| {
            SpeechError::SynthesisFailed(format!("Failed to wait for espeak-ng: {e}"))
        })?;
        fed.map_err(|e| {
            SpeechError::SynthesisFailed(format!("Failed to write to espeak-ng stdin: {e}"))
        })?;

        if !output.status.success() {
            return Err(SpeechError::SynthesisFailed(format!(
                "espeak-ng --voices exited with status {}",
                output.status
            )));
        }

        let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
        debug!(count = voices.len(), "Listed espeak-ng voices");
        Ok(voices)
    }

    #[instrument(
        skip(self, utterance),
        fields(lang = %utterance.lang, voice = ?utterance.voice, text_len = utterance.text.len())
    )]
    async fn synthesize(&self, utterance: &Utterance) -> Result<AudioData, SpeechError> {
        if utterance.text.trim().is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "Cannot synthesize empty text".to_string(),
            ));
        }

        let voice = utterance
            .voice
            .clone()
            .unwrap_or_else(|| utterance.lang.primary().to_string());

        let mut cmd = Command::new(self.executable());
        cmd.arg("--stdout")
            .arg("--stdin")
            .arg("-v")
            .arg(&voice)
            .arg("-s")
            .arg(self.words_per_minute(utterance.rate).to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!("Running espeak-ng: {:?}", cmd);

        let mut child = cmd.spawn().map_err(|e| self.spawn_error(&e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(utterance.text.as_bytes()).await.map_err(|e| {
                SpeechError::SynthesisFailed(format!("Failed to write to espeak-ng stdin: {e}"))
            })?;
        }

        let output = child.wait_with_output().await.map_err(|e| {
            SpeechError::SynthesisFailed(format!("Failed to wait for espeak-ng: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("espeak-ng failed: {}", stderr);
            return Err(SpeechError::SynthesisFailed(format!(
                "espeak-ng exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(SpeechError::SynthesisFailed(
                "espeak-ng produced empty output".to_string(),
            ));
        }

        Ok(AudioData::new(output.stdout, AudioFormat::Wav))
    }

    async fn is_available(&self) -> bool {
        Command::new(self.executable())
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .is_ok_and(|s| s.success())
    }

    fn engine_name(&self) -> &str {
        "espeak-ng"
    }
}
