//! Event recorder
//!
//! Captures timestamped button presses while recording mode is active and
//! finalizes them into a `Recording` together with an assignment snapshot.
//! `record` arrives from the press routing task while `start`/`stop` come
//! from API handlers, so the buffer sits behind a mutex; arrival order at the
//! mutex is the stored order.

use padband_common::model::{ButtonAction, Recording, SoundAssignments};
use std::sync::Mutex;
use tracing::debug;

/// Recorder state machine: Idle -> Recording -> Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

struct Inner {
    state: RecorderState,
    buffer: Vec<ButtonAction>,
}

/// Captures a chronological press sequence while recording mode is active
pub struct EventRecorder {
    inner: Mutex<Inner>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: RecorderState::Idle,
                buffer: Vec::new(),
            }),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).state
    }

    /// Enter recording mode, clearing any stale buffer
    ///
    /// Returns false (and changes nothing) if already recording.
    pub fn start(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.state == RecorderState::Recording {
            return false;
        }
        inner.state = RecorderState::Recording;
        inner.buffer.clear();
        true
    }

    /// Append a press to the buffer; no-op while idle
    pub fn record(&self, action: ButtonAction) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.state != RecorderState::Recording {
            debug!("Ignoring press of button {} while idle", action.button);
            return;
        }
        inner.buffer.push(action);
    }

    /// Number of presses captured so far
    pub fn pending_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).buffer.len()
    }

    /// Leave recording mode and build a `Recording` from the buffer
    ///
    /// `instruments` is the caller's deep copy of the live assignment table;
    /// it is frozen into the recording so later edits stay isolated. Safe on
    /// an empty buffer (yields a zero-action recording). Returns `None` if
    /// not recording.
    pub fn stop(&self, name: Option<String>, instruments: SoundAssignments) -> Option<Recording> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if inner.state != RecorderState::Recording {
            return None;
        }
        inner.state = RecorderState::Idle;
        let actions = std::mem::take(&mut inner.buffer);
        Some(Recording::new(name, actions, instruments))
    }
}

impl Default for EventRecorder {
    fn default() -> Self {
        Self::new()
    }
}
