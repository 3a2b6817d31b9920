//! Port definitions for speech dispatch
//!
//! Defines the traits (ports) the dispatcher drives. Adapters live in
//! [`crate::providers`].

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::markup::SynthesisRequest;
use crate::playback::{PlaybackOutcome, StopSignal};
use crate::types::{AudioData, Utterance, VoiceInfo};

/// Port for the remote synthesis service
///
/// # Example
///
/// ```ignore
/// use speech::{RemoteSynthesis, SynthesisRequest};
///
/// async fn fetch(remote: &impl RemoteSynthesis, request: &SynthesisRequest) {
///     match remote.synthesize(request).await {
///         Ok(audio) => println!("{} bytes", audio.size_bytes()),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// ```
#[async_trait]
pub trait RemoteSynthesis: Send + Sync {
    /// Turn a request into playable audio
    ///
    /// Exactly one network call; no retries.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` on transport failure, a non-success status, or
    /// a payload that is not audio.
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioData, SpeechError>;

    /// The endpoint requests are sent to
    fn endpoint(&self) -> &str;
}

/// Port for local speech engines used as fallback
#[async_trait]
pub trait LocalSynthesis: Send + Sync {
    /// List the voices the engine offers
    ///
    /// May be empty while the engine is still loading.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if the engine cannot be queried.
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError>;

    /// Speak an utterance into audio
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn synthesize(&self, utterance: &Utterance) -> Result<AudioData, SpeechError>;

    /// Check if the engine is installed and usable
    async fn is_available(&self) -> bool;

    /// Engine name for logs
    fn engine_name(&self) -> &str;
}

/// Port for audio playback
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Play audio until it ends or `stop` fires
    ///
    /// Returns `Stopped` when interrupted, `Completed` otherwise.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Playback` if the audio cannot be played.
    async fn play(&self, audio: AudioData, stop: StopSignal)
    -> Result<PlaybackOutcome, SpeechError>;
}
