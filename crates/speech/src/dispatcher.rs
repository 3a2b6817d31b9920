//! Speech dispatcher
//!
//! Turns annotated text into a synthesis request, sends it to the remote
//! service once, and falls back to the local engine when that fails. The
//! caller gets a [`PlaybackController`] right away; everything else happens
//! on a spawned task.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domain::{
    Language, LanguageCode, VoiceVariant, plain_text_for_speech, sanitize_for_speech,
    segment_bilingual,
};
use tracing::{Instrument, debug, error, info, instrument, warn};

use crate::catalog::VoiceCatalog;
use crate::config::{LocalEngine, SpeechConfig};
use crate::error::SpeechError;
use crate::markup::{SynthesisMode, SynthesisRequest, build_ssml};
use crate::playback::{PlaybackController, PlaybackOutcome};
use crate::ports::{AudioOutput, LocalSynthesis, RemoteSynthesis};
use crate::providers::{CloudSpeechProvider, CommandPlayer, EspeakProvider, PiperProvider};
use crate::slot::SpeakingSlot;
use crate::types::{AudioData, Utterance, VoiceInfo, select_voice};

/// Which path serves a request
#[derive(Debug)]
pub enum Route {
    /// The remote service returned audio
    Remote(AudioData),
    /// The remote service failed; the local engine speaks instead
    Fallback(SpeechError),
}

impl From<Result<AudioData, SpeechError>> for Route {
    fn from(result: Result<AudioData, SpeechError>) -> Self {
        match result {
            Ok(audio) => Self::Remote(audio),
            Err(e) => Self::Fallback(e),
        }
    }
}

/// Dispatches speech requests to the remote service or the local engine
#[derive(Clone)]
pub struct SpeechDispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    remote: Arc<dyn RemoteSynthesis>,
    local: Arc<dyn LocalSynthesis>,
    output: Arc<dyn AudioOutput>,
    catalog: VoiceCatalog,
    foreign_language: LanguageCode,
    foreign_rate: String,
    fallback_rate: f32,
    voice_retry_delay: Duration,
    slot: SpeakingSlot,
}

impl fmt::Debug for SpeechDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechDispatcher")
            .field("endpoint", &self.inner.remote.endpoint())
            .field("local_engine", &self.inner.local.engine_name())
            .field("foreign_language", &self.inner.foreign_language)
            .finish_non_exhaustive()
    }
}

impl SpeechDispatcher {
    /// Create a dispatcher from explicit adapters
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn new(
        config: &SpeechConfig,
        remote: Arc<dyn RemoteSynthesis>,
        local: Arc<dyn LocalSynthesis>,
        output: Arc<dyn AudioOutput>,
    ) -> Result<Self, SpeechError> {
        config.validate().map_err(SpeechError::Configuration)?;

        Ok(Self {
            inner: Arc::new(Inner {
                remote,
                local,
                output,
                catalog: config.voices.clone(),
                foreign_language: config.foreign_language.clone(),
                foreign_rate: config.foreign_rate.clone(),
                fallback_rate: config.fallback.rate,
                voice_retry_delay: Duration::from_millis(config.fallback.voice_retry_delay_ms),
                slot: SpeakingSlot::new(),
            }),
        })
    }

    /// Create a dispatcher with the HTTP provider, the configured local
    /// engine and the external player
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the configuration is invalid.
    pub fn from_config(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let remote = Arc::new(CloudSpeechProvider::new(config)?);
        let local: Arc<dyn LocalSynthesis> = match config.fallback.engine {
            LocalEngine::Espeak => Arc::new(EspeakProvider::new(config.fallback.espeak.clone())),
            LocalEngine::Piper => {
                let piper = config.fallback.piper.clone().ok_or_else(|| {
                    SpeechError::Configuration("Piper engine selected without settings".to_string())
                })?;
                Arc::new(PiperProvider::new(piper)?)
            },
        };
        let output = Arc::new(CommandPlayer::new(config.player.clone()));

        Self::new(config, remote, local, output)
    }

    /// The request shape used for a language code
    ///
    /// The configured foreign language is read by one voice; any other code
    /// means the text mixes both languages.
    pub fn mode_for(&self, language_code: &LanguageCode) -> SynthesisMode {
        if *language_code == self.inner.foreign_language {
            SynthesisMode::SingleLanguage
        } else {
            SynthesisMode::Bilingual
        }
    }

    /// Build the synthesis request for a text
    ///
    /// Returns `None` when nothing is left to speak after sanitizing.
    pub fn build_request(
        &self,
        text: &str,
        language_code: &LanguageCode,
        variant: VoiceVariant,
    ) -> Option<SynthesisRequest> {
        let catalog = &self.inner.catalog;
        match self.mode_for(language_code) {
            SynthesisMode::SingleLanguage => {
                let text = plain_text_for_speech(text);
                if text.is_empty() {
                    return None;
                }
                Some(SynthesisRequest::PlainText {
                    text,
                    voice: catalog.resolve(Language::Foreign, variant).clone(),
                })
            },
            SynthesisMode::Bilingual => {
                let segments = segment_bilingual(&sanitize_for_speech(text));
                if segments.is_empty() {
                    return None;
                }
                Some(SynthesisRequest::Markup {
                    ssml: build_ssml(&segments, catalog, variant, &self.inner.foreign_rate),
                    base_voice: catalog.resolve(Language::Native, variant).clone(),
                })
            },
        }
    }

    /// Speak a text
    ///
    /// Returns immediately with a controller for the playback; synthesis and
    /// playback run on a spawned task. Remote failures never reach the
    /// caller: the local engine speaks the plain text instead and the
    /// controller behaves the same either way.
    ///
    /// Returns `None` for empty input, when nothing is left to speak after
    /// sanitizing, or when called outside a Tokio runtime.
    #[instrument(skip_all, fields(text_len = text.len(), language = %language_code, variant = %variant))]
    pub fn request_speech(
        &self,
        text: &str,
        language_code: &LanguageCode,
        variant: VoiceVariant,
    ) -> Option<PlaybackController> {
        if text.trim().is_empty() {
            debug!("Nothing to speak");
            return None;
        }

        let Some(request) = self.build_request(text, language_code, variant) else {
            debug!("Nothing left to speak after sanitizing");
            return None;
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                error!("Speech requested outside a Tokio runtime: {e}");
                return None;
            },
        };

        let controller = PlaybackController::new();
        let job = SpeechJob {
            request,
            fallback_text: plain_text_for_speech(text),
            language: language_code.clone(),
            controller: controller.clone(),
        };

        info!(mode = ?job.request.mode(), "Dispatching speech request");
        runtime.spawn(
            Arc::clone(&self.inner)
                .run(job)
                .instrument(tracing::Span::current()),
        );

        Some(controller)
    }

    /// List the voices of the local engine
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the engine cannot be queried.
    pub async fn local_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        self.inner.local.list_voices().await
    }

    /// Whether the local engine can be run
    pub async fn local_engine_available(&self) -> bool {
        self.inner.local.is_available().await
    }

    /// Name of the local engine
    pub fn local_engine(&self) -> &str {
        self.inner.local.engine_name()
    }

    /// The remote endpoint
    pub fn endpoint(&self) -> &str {
        self.inner.remote.endpoint()
    }
}

struct SpeechJob {
    request: SynthesisRequest,
    fallback_text: String,
    language: LanguageCode,
    controller: PlaybackController,
}

impl Inner {
    async fn run(self: Arc<Self>, job: SpeechJob) {
        let route = Route::from(self.remote.synthesize(&job.request).await);

        if job.controller.is_stopped() {
            debug!("Playback stopped before audio arrived, discarding");
            return;
        }

        let outcome = match route {
            Route::Remote(audio) => match self.play(audio, &job.controller).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(error = %e, "Remote audio could not be played, using local fallback");
                    self.speak_locally(&job).await
                },
            },
            Route::Fallback(e) => {
                warn!(
                    error = %e,
                    endpoint = self.remote.endpoint(),
                    "Remote synthesis failed, using local fallback"
                );
                self.speak_locally(&job).await
            },
        };

        debug!(?outcome, "Speech request finished");
        job.controller.finish(outcome);
    }

    async fn play(
        &self,
        audio: AudioData,
        controller: &PlaybackController,
    ) -> Result<PlaybackOutcome, SpeechError> {
        if !controller.mark_playing() {
            return Ok(PlaybackOutcome::Stopped);
        }
        self.output.play(audio, controller.stop_signal()).await
    }

    async fn speak_locally(&self, job: &SpeechJob) -> PlaybackOutcome {
        let controller = &job.controller;
        self.slot.acquire(controller);
        let outcome = self.speak_locally_in_slot(job).await;
        self.slot.release(controller);
        outcome
    }

    async fn speak_locally_in_slot(&self, job: &SpeechJob) -> PlaybackOutcome {
        if !self.local.is_available().await {
            error!(engine = self.local.engine_name(), "Local engine unavailable");
            return PlaybackOutcome::Failed;
        }

        let voice = self.local_voice(&job.language).await;
        let utterance = Utterance::new(job.fallback_text.clone(), job.language.clone())
            .with_rate(self.fallback_rate)
            .with_voice(voice);

        let audio = match self.local.synthesize(&utterance).await {
            Ok(audio) => audio,
            Err(e) => {
                error!(error = %e, engine = self.local.engine_name(), "Local synthesis failed");
                return PlaybackOutcome::Failed;
            },
        };

        if job.controller.is_stopped() {
            return PlaybackOutcome::Stopped;
        }

        match self.play(audio, &job.controller).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Local audio could not be played");
                PlaybackOutcome::Failed
            },
        }
    }

    /// Best local voice for a language, listing voices a second time when
    /// the engine has not loaded any yet
    async fn local_voice(&self, language: &LanguageCode) -> Option<String> {
        let mut voices = self.list_local_voices().await;
        if voices.is_empty() {
            debug!(delay = ?self.voice_retry_delay, "No local voices yet, retrying");
            tokio::time::sleep(self.voice_retry_delay).await;
            voices = self.list_local_voices().await;
        }

        let voice = select_voice(&voices, language).map(|v| v.id.clone());
        if voice.is_none() {
            debug!(%language, "No matching local voice, using engine default");
        }
        voice
    }

    async fn list_local_voices(&self) -> Vec<VoiceInfo> {
        self.local.list_voices().await.unwrap_or_else(|e| {
            warn!(error = %e, engine = self.local.engine_name(), "Failed to list local voices");
            Vec::new()
        })
    }
}
