//! Single speaking slot for the local engine
//!
//! Local utterances must never overlap: starting one stops whichever
//! utterance currently holds the slot.

use parking_lot::Mutex;
use tracing::debug;

use crate::playback::PlaybackController;

/// Holder of the "currently speaking" fallback utterance
#[derive(Debug, Default)]
pub struct SpeakingSlot {
    current: Mutex<Option<PlaybackController>>,
}

impl SpeakingSlot {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the slot, stopping the previous holder
    pub fn acquire(&self, controller: &PlaybackController) {
        let previous = self.current.lock().replace(controller.clone());
        if let Some(previous) = previous.filter(|p| !p.same_as(controller)) {
            debug!("Stopping previous local utterance");
            previous.stop();
        }
    }

    /// Clear the slot if `controller` still holds it
    pub fn release(&self, controller: &PlaybackController) {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|c| c.same_as(controller)) {
            *current = None;
        }
    }
}
