//! Speech dispatch provider implementations
//!
//! Contains concrete implementations of the `RemoteSynthesis`,
//! `LocalSynthesis` and `AudioOutput` traits.

pub mod cloud;
pub mod espeak;
pub mod piper;
pub mod player;

pub use cloud::CloudSpeechProvider;
pub use espeak::EspeakProvider;
pub use piper::PiperProvider;
pub use player::CommandPlayer;
