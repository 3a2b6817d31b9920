//! Speech - bilingual speech dispatch
//!
//! Turns text annotated with `**foreign**` spans into speech:
//! - `SpeechDispatcher` - builds the request, calls the remote service and
//!   falls back to a local engine
//! - `PlaybackController` - stop, end callbacks and waiting for one utterance
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! # Supported Providers
//!
//! - Cloud speech synthesis through an HTTP proxy
//! - espeak-ng and Piper as local fallback engines
//! - Any stdin-reading player command for output (`ffplay` by default)
//!
//! # Example
//!
//! ```ignore
//! use domain::{LanguageCode, VoiceVariant};
//! use speech::{SpeechConfig, SpeechDispatcher};
//!
//! let dispatcher = SpeechDispatcher::from_config(&SpeechConfig::default())?;
//! let spanish = LanguageCode::new("es-ES")?;
//!
//! if let Some(playback) = dispatcher.request_speech("Se dice **house**.", &spanish, VoiceVariant::Female) {
//!     playback.on_ended(|outcome| println!("done: {outcome:?}"));
//!     playback.wait().await;
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod markup;
pub mod playback;
pub mod ports;
pub mod providers;
pub mod slot;
pub mod types;

pub use catalog::{VoiceCatalog, VoiceSet};
pub use config::{
    EspeakConfig, FallbackConfig, LocalEngine, LocalTtsConfig, PlayerConfig, SpeechConfig,
    SpeechEnvironment,
};
pub use dispatcher::{Route, SpeechDispatcher};
pub use error::SpeechError;
pub use markup::{RequestBody, SynthesisMode, SynthesisRequest, build_ssml};
pub use playback::{PlaybackController, PlaybackOutcome, PlaybackStatus, StopSignal};
pub use ports::{AudioOutput, LocalSynthesis, RemoteSynthesis};
pub use providers::{CloudSpeechProvider, CommandPlayer, EspeakProvider, PiperProvider};
pub use slot::SpeakingSlot;
pub use types::{AudioData, AudioFormat, LanguageMatch, Utterance, VoiceInfo, select_voice};
