//! Playback control handed back to callers
//!
//! A [`PlaybackController`] is returned before any audio exists. The task
//! that produces and plays the audio reports into the same shared state, so
//! callers see one interface whether the remote service or the local engine
//! served the request.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

/// Where a playback currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Audio is still being synthesized
    Pending,
    /// Audio is playing
    Playing,
    /// Playback finished on its own (completed or failed)
    Ended,
    /// Playback was stopped by the caller
    Stopped,
}

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// All audio was played
    Completed,
    /// `stop()` was called first
    Stopped,
    /// Neither path produced playable audio
    Failed,
}

type EndedCallback = Box<dyn FnOnce(PlaybackOutcome) + Send + 'static>;

struct State {
    status: PlaybackStatus,
    outcome: Option<PlaybackOutcome>,
    callbacks: Vec<EndedCallback>,
}

struct Shared {
    state: Mutex<State>,
    stop_tx: watch::Sender<bool>,
    outcome_tx: watch::Sender<Option<PlaybackOutcome>>,
}

/// Handle to one requested utterance
///
/// Cheap to clone; all clones control the same playback.
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

impl PlaybackController {
    pub(crate) fn new() -> Self {
        let (stop_tx, _) = watch::channel(false);
        let (outcome_tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    status: PlaybackStatus::Pending,
                    outcome: None,
                    callbacks: Vec::new(),
                }),
                stop_tx,
                outcome_tx,
            }),
        }
    }

    /// Halt playback and discard it
    ///
    /// Idempotent, and a no-op once playback has ended. Registered
    /// `on_ended` callbacks are dropped without being called. A remote
    /// request still in flight is not aborted; its audio is never played.
    pub fn stop(&self) {
        {
            let mut state = self.shared.state.lock();
            if matches!(state.status, PlaybackStatus::Ended | PlaybackStatus::Stopped) {
                return;
            }
            state.status = PlaybackStatus::Stopped;
            state.outcome = Some(PlaybackOutcome::Stopped);
            state.callbacks.clear();
        }
        self.shared.stop_tx.send_replace(true);
        self.shared
            .outcome_tx
            .send_replace(Some(PlaybackOutcome::Stopped));
    }

    /// Register a one-shot callback for the end of playback
    ///
    /// Runs immediately when playback has already ended. Never runs for a
    /// stopped playback.
    pub fn on_ended<F>(&self, callback: F)
    where
        F: FnOnce(PlaybackOutcome) + Send + 'static,
    {
        let ended = {
            let mut state = self.shared.state.lock();
            match state.status {
                PlaybackStatus::Pending | PlaybackStatus::Playing => {
                    state.callbacks.push(Box::new(callback));
                    return;
                },
                PlaybackStatus::Stopped => return,
                PlaybackStatus::Ended => state.outcome,
            }
        };
        if let Some(outcome) = ended {
            callback(outcome);
        }
    }

    /// Wait until playback completes, fails or is stopped
    pub async fn wait(&self) -> PlaybackOutcome {
        let mut rx = self.shared.outcome_tx.subscribe();
        let outcome = rx.wait_for(Option::is_some).await.ok().and_then(|o| *o);
        outcome.unwrap_or(PlaybackOutcome::Failed)
    }

    /// Current status
    pub fn status(&self) -> PlaybackStatus {
        self.shared.state.lock().status
    }

    /// Whether `stop()` has been called
    pub fn is_stopped(&self) -> bool {
        self.status() == PlaybackStatus::Stopped
    }

    /// Whether both handles control the same playback
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Move from pending to playing; `false` when already stopped
    pub(crate) fn mark_playing(&self) -> bool {
        let mut state = self.shared.state.lock();
        match state.status {
            PlaybackStatus::Pending => {
                state.status = PlaybackStatus::Playing;
                true
            },
            PlaybackStatus::Playing => true,
            PlaybackStatus::Ended | PlaybackStatus::Stopped => false,
        }
    }

    /// Record the end of playback and run the callbacks
    ///
    /// A playback that was stopped stays stopped.
    pub(crate) fn finish(&self, outcome: PlaybackOutcome) {
        if outcome == PlaybackOutcome::Stopped {
            self.stop();
            return;
        }

        let callbacks = {
            let mut state = self.shared.state.lock();
            if matches!(state.status, PlaybackStatus::Ended | PlaybackStatus::Stopped) {
                return;
            }
            state.status = PlaybackStatus::Ended;
            state.outcome = Some(outcome);
            std::mem::take(&mut state.callbacks)
        };
        self.shared.outcome_tx.send_replace(Some(outcome));
        for callback in callbacks {
            callback(outcome);
        }
    }

    /// A receiver that resolves when `stop()` is called
    pub(crate) fn stop_signal(&self) -> StopSignal {
        StopSignal {
            rx: self.shared.stop_tx.subscribe(),
        }
    }
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

/// Stop notification passed to audio outputs
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Resolve once playback is stopped; pends forever otherwise
    pub async fn stopped(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Whether playback has been stopped
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, impl FnOnce(PlaybackOutcome) + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn starts_pending() {
        let controller = PlaybackController::new();
        assert_eq!(controller.status(), PlaybackStatus::Pending);
        assert!(!controller.is_stopped());
    }

    #[test]
    fn on_ended_fires_once_on_completion() {
        let controller = PlaybackController::new();
        let (count, callback) = counter();
        controller.on_ended(callback);

        assert!(controller.mark_playing());
        controller.finish(PlaybackOutcome::Completed);
        controller.finish(PlaybackOutcome::Completed);

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(controller.status(), PlaybackStatus::Ended);
    }

    #[test]
    fn on_ended_fires_on_failure() {
        let controller = PlaybackController::new();
        let seen = Arc::new(Mutex::new(None));
        let inner = Arc::clone(&seen);
        controller.on_ended(move |outcome| *inner.lock() = Some(outcome));

        controller.finish(PlaybackOutcome::Failed);

        assert_eq!(*seen.lock(), Some(PlaybackOutcome::Failed));
    }

    #[test]
    fn on_ended_after_end_fires_immediately() {
        let controller = PlaybackController::new();
        controller.finish(PlaybackOutcome::Completed);

        let (count, callback) = counter();
        controller.on_ended(callback);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_discards_callbacks() {
        let controller = PlaybackController::new();
        let (count, callback) = counter();
        controller.on_ended(callback);

        controller.stop();
        controller.finish(PlaybackOutcome::Completed);

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(controller.status(), PlaybackStatus::Stopped);
    }

    #[test]
    fn on_ended_after_stop_never_fires() {
        let controller = PlaybackController::new();
        controller.stop();
        let (count, callback) = counter();
        controller.on_ended(callback);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn stop_is_idempotent_and_noop_after_end() {
        let controller = PlaybackController::new();
        controller.stop();
        controller.stop();
        assert!(controller.is_stopped());

        let ended = PlaybackController::new();
        ended.finish(PlaybackOutcome::Completed);
        ended.stop();
        assert_eq!(ended.status(), PlaybackStatus::Ended);
        assert!(!ended.stop_signal().is_stopped());
    }

    #[test]
    fn mark_playing_refuses_after_stop() {
        let controller = PlaybackController::new();
        controller.stop();
        assert!(!controller.mark_playing());
    }

    #[test]
    fn clones_share_state() {
        let controller = PlaybackController::new();
        let clone = controller.clone();
        clone.stop();
        assert!(controller.is_stopped());
        assert!(controller.same_as(&clone));
        assert!(!controller.same_as(&PlaybackController::new()));
    }

    #[tokio::test]
    async fn wait_resolves_with_outcome() {
        let controller = PlaybackController::new();
        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.wait().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        controller.finish(PlaybackOutcome::Completed);
        assert_eq!(task.await.unwrap(), PlaybackOutcome::Completed);
    }

    #[tokio::test]
    async fn wait_after_stop_resolves_stopped() {
        let controller = PlaybackController::new();
        controller.stop();
        assert_eq!(controller.wait().await, PlaybackOutcome::Stopped);
    }

    #[tokio::test]
    async fn stop_signal_wakes_waiter() {
        let controller = PlaybackController::new();
        let mut signal = controller.stop_signal();
        assert!(!signal.is_stopped());

        let waiter = tokio::spawn(async move {
            signal.stopped().await;
        });
        controller.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("stop signal should fire")
            .unwrap();
    }

    #[test]
    fn debug_shows_status() {
        let controller = PlaybackController::new();
        assert!(format!("{controller:?}").contains("Pending"));
    }
}
