//! Cloud speech synthesis provider
//!
//! Implements `RemoteSynthesis` against the speech proxy endpoint.
//!
//! # Response formats
//!
//! - Proxy mode: the body is the MP3 itself
//! - Direct API mode: JSON `{"audioContent": "<base64>"}`
//!
//! Errors come back as `{"error": {"code", "message", "status"}}` or as
//! plain text.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::markup::SynthesisRequest;
use crate::ports::RemoteSynthesis;
use crate::types::{AudioData, AudioFormat};

/// Remote synthesis over HTTP
#[derive(Debug, Clone)]
pub struct CloudSpeechProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    encoding: AudioFormat,
}

impl CloudSpeechProvider {
    /// Create a provider for the configured environment
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the endpoint is missing or the
    /// HTTP client cannot be built.
    pub fn new(config: &SpeechConfig) -> Result<Self, SpeechError> {
        let endpoint = config
            .endpoint()
            .map_err(SpeechError::Configuration)?
            .to_string();

        let mut builder = Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().map_err(|e| {
            SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            encoding: config.audio_encoding,
        })
    }

    /// Turn an error response into a `SpeechError`
    fn error_from_response(status: reqwest::StatusCode, body: &str) -> SpeechError {
        let message = serde_json::from_str::<ApiError>(body).map_or_else(
            |_| body.trim().to_string(),
            |api_error| api_error.error.message,
        );

        match status.as_u16() {
            429 => SpeechError::RateLimited,
            503 => SpeechError::ServiceUnavailable(message),
            _ => SpeechError::SynthesisFailed(format!("HTTP {status}: {message}")),
        }
    }

    /// Decode a JSON success body
    fn decode_json_audio(&self, body: &[u8]) -> Result<AudioData, SpeechError> {
        let response: AudioContentResponse = serde_json::from_slice(body)
            .map_err(|e| SpeechError::InvalidResponse(format!("Unexpected JSON body: {e}")))?;
        let audio = STANDARD
            .decode(response.audio_content.trim())
            .map_err(|e| SpeechError::InvalidResponse(format!("Invalid base64 audio: {e}")))?;
        if audio.is_empty() {
            return Err(SpeechError::InvalidResponse(
                "audioContent is empty".to_string(),
            ));
        }
        Ok(AudioData::new(audio, self.encoding))
    }
}

/// Direct API success body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AudioContentResponse {
    audio_content: String,
}

/// Error body
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl RemoteSynthesis for CloudSpeechProvider {
    #[instrument(
        skip(self, request),
        fields(mode = ?request.mode(), voice = %request.voice().voice_id, payload_len = request.payload_len())
    )]
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<AudioData, SpeechError> {
        debug!("Requesting remote synthesis");

        let mut http_request = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, self.encoding.mime_type())
            .json(&request.to_body(self.encoding));
        if let Some(key) = &self.api_key {
            http_request = http_request.query(&[("key", key)]);
        }

        let response = http_request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::error_from_response(status, &error_body));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body: Bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to read audio: {e}")))?;

        if body.is_empty() {
            return Err(SpeechError::InvalidResponse("Empty audio body".to_string()));
        }

        let audio = if content_type.starts_with("application/json") {
            self.decode_json_audio(&body)?
        } else {
            let format = AudioFormat::from_mime_type(&content_type).unwrap_or(self.encoding);
            AudioData::new(body.to_vec(), format)
        };

        debug!(audio_size = audio.size_bytes(), format = %audio.format(), "Remote synthesis complete");
        Ok(audio)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
