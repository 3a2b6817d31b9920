//! Speech dispatch errors

use thiserror::Error;

/// Errors that can occur while synthesizing or playing speech
///
/// None of these reach callers of
/// [`SpeechDispatcher::request_speech`](crate::SpeechDispatcher::request_speech);
/// they select the fallback path and end up in the logs.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Failed to connect to the synthesis endpoint
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the synthesis endpoint failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Synthesis failed
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Response could not be turned into audio
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The transport gave up waiting for the endpoint
    #[error("Speech request timed out")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Service unavailable
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Audio output failed
    #[error("Playback failed: {0}")]
    Playback(String),

    /// Provider not available (not installed or configured)
    #[error("Provider not available: {0}")]
    NotAvailable(String),
}

impl From<reqwest::Error> for SpeechError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
