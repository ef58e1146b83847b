//! Sound resolver
//!
//! Maps button numbers to sound assets and drives the fetch-then-play path
//! for every trigger, live or replayed. Triggers are fire-and-forget: the
//! caller never waits on the network, and a fetch failure is logged and
//! swallowed so one missing asset cannot stall a sequence.
//!
//! Two guards decide whether a completed fetch may still play:
//! - a per-button trigger sequence number (last-trigger-wins per channel), and
//! - an optional session token, so triggers fired by a replay session that
//!   has since been stopped are discarded instead of played late.

use crate::sounds::{AudioSink, SoundStore};
use padband_common::events::{EventBus, PadEvent};
use padband_common::model::{SoundAssignments, SoundRef, BUTTON_COUNT};
use padband_common::{Error, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

/// Token identifying one replay session
///
/// A trigger carrying a token plays only while the token's generation is
/// still the session counter's current value; stopping or superseding the
/// session bumps the counter and orphans every in-flight fetch.
#[derive(Clone)]
pub struct SessionToken {
    id: u64,
    current: Arc<AtomicU64>,
}

impl SessionToken {
    pub fn is_live(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.id
    }
}

/// Generation counter minting session tokens
#[derive(Default)]
pub struct SessionGeneration {
    current: Arc<AtomicU64>,
}

impl SessionGeneration {
    /// Invalidate all outstanding tokens and mint the next one
    pub fn next(&self) -> SessionToken {
        let id = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        SessionToken {
            id,
            current: Arc::clone(&self.current),
        }
    }

    /// Invalidate all outstanding tokens without minting a new one
    pub fn invalidate(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }
}

/// Button-to-sound resolution and trigger dispatch
pub struct SoundResolver {
    assignments: RwLock<SoundAssignments>,
    store: Arc<dyn SoundStore>,
    sink: Arc<dyn AudioSink>,
    events: Arc<EventBus>,
    /// Per-button trigger sequence, index 1..=BUTTON_COUNT
    channel_seq: Arc<Vec<AtomicU64>>,
}

impl SoundResolver {
    pub fn new(store: Arc<dyn SoundStore>, sink: Arc<dyn AudioSink>, events: Arc<EventBus>) -> Self {
        let channel_seq = (0..=BUTTON_COUNT).map(|_| AtomicU64::new(0)).collect();
        Self {
            assignments: RwLock::new(SoundAssignments::new()),
            store,
            sink,
            events,
            channel_seq: Arc::new(channel_seq),
        }
    }

    /// Current assignment for a button
    pub fn assignment(&self, button: u8) -> Option<SoundRef> {
        self.assignments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&button)
            .cloned()
    }

    /// Deep copy of the whole assignment table
    pub fn snapshot(&self) -> SoundAssignments {
        self.assignments
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Assign a sound to a button
    pub fn assign(&self, button: u8, sound: SoundRef) -> Result<()> {
        if !(1..=BUTTON_COUNT).contains(&button) {
            return Err(Error::InvalidInput(format!(
                "Button {} out of range 1..={}",
                button, BUTTON_COUNT
            )));
        }
        self.assignments
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(button, sound);
        Ok(())
    }

    /// Remove a button's assignment
    pub fn unassign(&self, button: u8) {
        self.assignments
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&button);
    }

    /// Replace the whole table (arrangement editor "Done")
    pub fn set_assignments(&self, table: SoundAssignments) -> Result<()> {
        if let Some(bad) = table.keys().find(|b| !(1..=BUTTON_COUNT).contains(*b)) {
            return Err(Error::InvalidInput(format!(
                "Button {} out of range 1..={}",
                bad, BUTTON_COUNT
            )));
        }
        *self.assignments.write().unwrap_or_else(|e| e.into_inner()) = table;
        Ok(())
    }

    /// Live play-along trigger: resolve from the current table
    ///
    /// An unassigned button is a no-op, not an error.
    pub fn trigger(&self, button: u8) {
        let Some(sound) = self.assignment(button) else {
            debug!("Button {} has no sound assigned", button);
            return;
        };
        self.spawn_trigger(button, sound, None);
    }

    /// Replay trigger: the caller resolved `sound` from a recording's
    /// instrument snapshot, and the play is tied to the session token
    pub fn trigger_with(&self, button: u8, sound: SoundRef, session: SessionToken) {
        self.spawn_trigger(button, sound, Some(session));
    }

    fn spawn_trigger(&self, button: u8, sound: SoundRef, session: Option<SessionToken>) {
        // A snapshot from an externally edited database can carry any key;
        // an unknown button never panics the trigger path.
        let Some(slot) = self.channel_seq.get(button as usize) else {
            warn!("Ignoring trigger for out-of-range button {}", button);
            return;
        };

        // Claim the channel: any earlier trigger still fetching is superseded.
        let seq = slot.fetch_add(1, Ordering::AcqRel) + 1;

        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let events = Arc::clone(&self.events);
        let channel_seq = Arc::clone(&self.channel_seq);

        tokio::spawn(async move {
            let bytes = match store.fetch_audio(&sound).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Sound fetch failed for button {} ({}): {}", button, sound, e);
                    events.emit(PadEvent::TriggerFailed {
                        button,
                        error: e.to_string(),
                        timestamp: chrono::Utc::now(),
                    });
                    return;
                }
            };

            // Superseded while fetching: a newer trigger owns this channel.
            if channel_seq[button as usize].load(Ordering::Acquire) != seq {
                debug!("Discarding superseded trigger for button {}", button);
                return;
            }

            // Owning replay session stopped while fetching: discard.
            if let Some(session) = &session {
                if !session.is_live() {
                    debug!("Discarding trigger for stopped session (button {})", button);
                    return;
                }
            }

            sink.stop(button).await;
            sink.play(button, bytes).await;
        });
    }
}
