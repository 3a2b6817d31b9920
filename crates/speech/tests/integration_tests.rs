//! Integration tests for the speech crate
//!
//! Runs the dispatcher with the real HTTP provider against a mocked
//! synthesis endpoint, and mocked local engine and audio output.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use domain::{LanguageCode, VoiceVariant};
use parking_lot::Mutex;
use speech::{
    AudioData, AudioFormat, AudioOutput, CloudSpeechProvider, LocalSynthesis, PlaybackController,
    PlaybackOutcome, PlaybackStatus, RemoteSynthesis, SpeechConfig, SpeechDispatcher,
    SpeechError, StopSignal, Utterance, VoiceInfo,
};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Create a test configuration pointing to mock server
fn test_config(base_url: &str) -> SpeechConfig {
    let mut config = SpeechConfig {
        local_endpoint: format!("{base_url}/api/tts"),
        ..Default::default()
    };
    config.fallback.voice_retry_delay_ms = 10;
    config
}

/// Create mock MP3 audio data (minimal valid MP3 header)
fn mock_mp3_audio() -> Vec<u8> {
    vec![
        0xFF, 0xFB, 0x90, 0x00, // MP3 frame header
        0x00, 0x00, 0x00, 0x00, // Padding
    ]
}

fn spanish() -> LanguageCode {
    LanguageCode::new("es-ES").unwrap()
}

fn english() -> LanguageCode {
    LanguageCode::new("en-US").unwrap()
}

/// Local engine that records what it was asked to say
struct RecordingEngine {
    voices: Vec<VoiceInfo>,
    utterances: Mutex<Vec<Utterance>>,
}

impl RecordingEngine {
    fn new() -> Self {
        Self {
            voices: vec![
                VoiceInfo::new("es", "Spanish").with_language("es"),
                VoiceInfo::new("en-us", "English (America)").with_language("en-US"),
            ],
            utterances: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl LocalSynthesis for RecordingEngine {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, SpeechError> {
        Ok(self.voices.clone())
    }

    async fn synthesize(&self, utterance: &Utterance) -> Result<AudioData, SpeechError> {
        self.utterances.lock().push(utterance.clone());
        Ok(AudioData::new(b"RIFF-local".to_vec(), AudioFormat::Wav))
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn engine_name(&self) -> &str {
        "recording"
    }
}

/// Audio output that records what it played
///
/// With `hold`, playback lasts until the stop signal fires.
#[derive(Default)]
struct RecordingOutput {
    hold: bool,
    played: Mutex<Vec<AudioData>>,
}

#[async_trait]
impl AudioOutput for RecordingOutput {
    async fn play(
        &self,
        audio: AudioData,
        mut stop: StopSignal,
    ) -> Result<PlaybackOutcome, SpeechError> {
        self.played.lock().push(audio);
        if self.hold {
            stop.stopped().await;
            return Ok(PlaybackOutcome::Stopped);
        }
        Ok(PlaybackOutcome::Completed)
    }
}

struct Setup {
    dispatcher: SpeechDispatcher,
    engine: Arc<RecordingEngine>,
    output: Arc<RecordingOutput>,
}

fn setup(mock_server: &MockServer, output: RecordingOutput) -> Setup {
    let config = test_config(&mock_server.uri());
    let remote = Arc::new(CloudSpeechProvider::new(&config).expect("Failed to create provider"));
    let engine = Arc::new(RecordingEngine::new());
    let output = Arc::new(output);
    let dispatcher = SpeechDispatcher::new(
        &config,
        remote,
        Arc::clone(&engine) as Arc<dyn LocalSynthesis>,
        Arc::clone(&output) as Arc<dyn AudioOutput>,
    )
    .expect("Failed to create dispatcher");
    Setup {
        dispatcher,
        engine,
        output,
    }
}

async fn wait_until_playing(controller: &PlaybackController) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.status() != PlaybackStatus::Playing {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("playback should start");
}

// ============ Remote Path ============

#[tokio::test]
async fn bilingual_request_reaches_endpoint_and_plays() {
    let mock_server = MockServer::start().await;

    let expected_ssml = concat!(
        r#"<speak><voice languageCode="es-ES" name="es-ES-Neural2-B">La palabra es</voice>"#,
        r#"<voice languageCode="en-US" name="en-US-Neural2-D"><prosody rate="90%">house.</prosody></voice></speak>"#
    );

    Mock::given(method("POST"))
        .and(path("/api/tts"))
        .and(body_partial_json(serde_json::json!({
            "ssml": expected_ssml,
            "voice": { "languageCode": "es-ES", "name": "es-ES-Neural2-B" },
            "audioConfig": { "audioEncoding": "MP3" }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(mock_mp3_audio()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let s = setup(&mock_server, RecordingOutput::default());
    let controller = s
        .dispatcher
        .request_speech("La palabra es **house**.", &spanish(), VoiceVariant::Male)
        .expect("controller");

    assert_eq!(controller.wait().await, PlaybackOutcome::Completed);

    let played = s.output.played.lock();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].data(), mock_mp3_audio().as_slice());
    assert_eq!(played[0].format(), AudioFormat::Mp3);
    assert!(s.engine.utterances.lock().is_empty());
}

#[tokio::test]
async fn single_language_request_sends_plain_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tts"))
        .and(body_partial_json(serde_json::json!({
            "text": "The house is big.",
            "voice": { "languageCode": "en-US", "name": "en-US-Neural2-F" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let s = setup(&mock_server, RecordingOutput::default());
    let controller = s
        .dispatcher
        .request_speech("The **house** is big.", &english(), VoiceVariant::Female)
        .expect("controller");

    assert_eq!(controller.wait().await, PlaybackOutcome::Completed);
    assert_eq!(s.output.played.lock().len(), 1);
}

// ============ Fallback Path ============

#[tokio::test]
async fn http_500_falls_back_with_same_controller_semantics() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tts"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": { "code": 500, "message": "Internal error", "status": "INTERNAL" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let s = setup(&mock_server, RecordingOutput::default());
    let controller = s
        .dispatcher
        .request_speech("La palabra es **house**.", &spanish(), VoiceVariant::Female)
        .expect("controller despite remote failure");

    let ended = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ended);
    controller.on_ended(move |outcome| {
        assert_eq!(outcome, PlaybackOutcome::Completed);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert_eq!(controller.wait().await, PlaybackOutcome::Completed);
    assert_eq!(ended.load(Ordering::SeqCst), 1);

    // stop after the end is a no-op, like on the remote path
    controller.stop();
    assert_eq!(controller.status(), PlaybackStatus::Ended);

    let utterances = s.engine.utterances.lock();
    assert_eq!(utterances.len(), 1);
    assert_eq!(utterances[0].text, "La palabra es house.");
    assert_eq!(utterances[0].voice.as_deref(), Some("es"));

    let played = s.output.played.lock();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].format(), AudioFormat::Wav);
}

#[tokio::test]
async fn stop_behaves_the_same_on_both_paths() {
    for status in [200, 500] {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/tts"))
            .respond_with(ResponseTemplate::new(status).set_body_bytes(mock_mp3_audio()))
            .mount(&mock_server)
            .await;

        let s = setup(
            &mock_server,
            RecordingOutput {
                hold: true,
                ..Default::default()
            },
        );
        let controller = s
            .dispatcher
            .request_speech("Hola **hello**", &spanish(), VoiceVariant::Female)
            .expect("controller");

        let ended = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ended);
        controller.on_ended(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        wait_until_playing(&controller).await;
        controller.stop();
        controller.stop();

        assert_eq!(controller.wait().await, PlaybackOutcome::Stopped, "status {status}");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ended.load(Ordering::SeqCst), 0, "status {status}");
        assert_eq!(controller.status(), PlaybackStatus::Stopped);
    }
}

#[tokio::test]
async fn unreachable_endpoint_falls_back() {
    let mut config = test_config("http://127.0.0.1:9");
    config.timeout_ms = Some(2000);
    let remote = Arc::new(CloudSpeechProvider::new(&config).unwrap());
    let engine = Arc::new(RecordingEngine::new());
    let output = Arc::new(RecordingOutput::default());
    let dispatcher = SpeechDispatcher::new(
        &config,
        remote,
        Arc::clone(&engine) as Arc<dyn LocalSynthesis>,
        Arc::clone(&output) as Arc<dyn AudioOutput>,
    )
    .unwrap();

    let controller = dispatcher
        .request_speech("good morning", &english(), VoiceVariant::Female)
        .expect("controller");

    assert_eq!(controller.wait().await, PlaybackOutcome::Completed);
    assert_eq!(engine.utterances.lock()[0].voice.as_deref(), Some("en-us"));
}

// ============ Cancellation ============

#[tokio::test]
async fn stop_before_delayed_response_plays_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(mock_mp3_audio())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let s = setup(&mock_server, RecordingOutput::default());
    let controller = s
        .dispatcher
        .request_speech("Hola", &spanish(), VoiceVariant::Female)
        .expect("controller");
    controller.stop();

    assert_eq!(controller.wait().await, PlaybackOutcome::Stopped);

    // Let the late response arrive
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(s.output.played.lock().is_empty());
    assert!(s.engine.utterances.lock().is_empty());
}

#[tokio::test]
async fn empty_input_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(mock_mp3_audio()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let s = setup(&mock_server, RecordingOutput::default());
    assert!(s.dispatcher.request_speech("   ", &spanish(), VoiceVariant::Female).is_none());
    assert!(s.dispatcher.request_speech("****", &spanish(), VoiceVariant::Female).is_none());
}

#[tokio::test]
async fn provider_reports_endpoint() {
    let mock_server = MockServer::start().await;
    let config = test_config(&mock_server.uri());
    let provider = CloudSpeechProvider::new(&config).unwrap();

    assert_eq!(provider.endpoint(), format!("{}/api/tts", mock_server.uri()));
}
