//! External player audio output
//!
//! Plays audio by piping it into a player process (`ffplay` by default).
//! The process is killed as soon as the stop signal fires.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

use crate::config::PlayerConfig;
use crate::error::SpeechError;
use crate::playback::{PlaybackOutcome, StopSignal};
use crate::ports::AudioOutput;
use crate::types::AudioData;

/// Audio output backed by a player command reading stdin
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    config: PlayerConfig,
}

impl CommandPlayer {
    /// Create a player from configuration
    #[must_use]
    pub const fn new(config: PlayerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AudioOutput for CommandPlayer {
    #[instrument(skip(self, audio, stop), fields(command = %self.config.command, audio_size = audio.size_bytes(), format = %audio.format()))]
    async fn play(
        &self,
        audio: AudioData,
        mut stop: StopSignal,
    ) -> Result<PlaybackOutcome, SpeechError> {
        if stop.is_stopped() {
            return Ok(PlaybackOutcome::Stopped);
        }

        let mut child = Command::new(&self.config.command)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SpeechError::Playback(format!("Failed to start '{}': {e}", self.config.command))
            })?;

        let stdin = child.stdin.take();
        let data = audio.into_data();

        let finished = {
            let playing = async {
                if let Some(mut stdin) = stdin {
                    // The player may exit before reading everything
                    if let Err(e) = stdin.write_all(&data).await {
                        debug!("Player closed stdin early: {e}");
                    }
                }
                child.wait().await
            };

            tokio::select! {
                status = playing => Some(status),
                () = stop.stopped() => None,
            }
        };

        match finished {
            None => {
                debug!("Stopping player");
                if let Err(e) = child.start_kill() {
                    warn!("Failed to kill player: {e}");
                }
                let _ = child.wait().await;
                Ok(PlaybackOutcome::Stopped)
            },
            Some(Ok(status)) if status.success() => Ok(PlaybackOutcome::Completed),
            Some(Ok(status)) => Err(SpeechError::Playback(format!(
                "{} exited with status {status}",
                self.config.command
            ))),
            Some(Err(e)) => Err(SpeechError::Playback(format!(
                "Failed to wait for {}: {e}",
                self.config.command
            ))),
        }
    }
}
