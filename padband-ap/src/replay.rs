//! Replay scheduler
//!
//! Reproduces the temporal pattern of a saved recording against a fresh time
//! origin. Absolute capture timestamps only matter as offsets from the first
//! action; replay walks a cursor over the sorted actions on a fine-grained
//! periodic tick and fires every due trigger without ever waiting on the
//! asset fetch.
//!
//! One global "now playing" slot: starting a new replay fully stops the
//! previous session, and `stop` invalidates the session token so triggers
//! still fetching when it returns can never play into a stale session.

use crate::resolver::{SessionGeneration, SessionToken, SoundResolver};
use padband_common::events::{EventBus, PadEvent};
use padband_common::model::{Recording, SoundRef};
use padband_common::time::offset_between;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant};
use tracing::{debug, info};
use uuid::Uuid;

/// Wake-up period of the replay cursor
pub const TICK: Duration = Duration::from_millis(10);

/// Where replay triggers land
///
/// `SoundResolver` is the production target; tests substitute a recorder to
/// observe fire order and timing directly.
pub trait TriggerTarget: Send + Sync {
    fn trigger_with(&self, button: u8, sound: SoundRef, session: SessionToken);
}

impl TriggerTarget for SoundResolver {
    fn trigger_with(&self, button: u8, sound: SoundRef, session: SessionToken) {
        SoundResolver::trigger_with(self, button, sound, session)
    }
}

/// Scheduler state visible to the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStatus {
    Idle,
    Playing { recording_id: Uuid },
    Finished { recording_id: Uuid },
}

struct Inner {
    status: ReplayStatus,
    task: Option<JoinHandle<()>>,
}

/// Drives playback triggers at reconstructed offsets
pub struct ReplayScheduler {
    target: Arc<dyn TriggerTarget>,
    events: Arc<EventBus>,
    generation: SessionGeneration,
    inner: Arc<Mutex<Inner>>,
}

impl ReplayScheduler {
    pub fn new(target: Arc<dyn TriggerTarget>, events: Arc<EventBus>) -> Self {
        Self {
            target,
            events,
            generation: SessionGeneration::default(),
            inner: Arc::new(Mutex::new(Inner {
                status: ReplayStatus::Idle,
                task: None,
            })),
        }
    }

    pub fn status(&self) -> ReplayStatus {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).status
    }

    /// Start replaying a recording, superseding any active session
    pub fn start(&self, recording: &Recording) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Self::halt_session(&self.generation, &self.events, &mut inner);

        let recording_id = recording.id;
        let actions = recording.sorted_actions();
        self.events.emit(PadEvent::ReplayStarted {
            recording_id,
            action_count: actions.len(),
            timestamp: chrono::Utc::now(),
        });

        // An empty recording replays as a no-op.
        let Some(first) = actions.first() else {
            info!("Replay of {} finished immediately (no actions)", recording_id);
            inner.status = ReplayStatus::Finished { recording_id };
            self.events.emit(PadEvent::ReplayFinished {
                recording_id,
                timestamp: chrono::Utc::now(),
            });
            return;
        };

        let base = first.timestamp;
        let offsets: Vec<Duration> = actions
            .iter()
            .map(|a| offset_between(base, a.timestamp))
            .collect();
        let instruments = recording.instruments.clone();

        let token = self.generation.next();
        let target = Arc::clone(&self.target);
        let events = Arc::clone(&self.events);
        let shared = Arc::clone(&self.inner);

        info!("Replay of {} started: {} actions", recording_id, actions.len());
        inner.status = ReplayStatus::Playing { recording_id };

        inner.task = Some(tokio::spawn(async move {
            let origin = Instant::now();
            let mut ticker = interval(TICK);
            let mut cursor = 0usize;

            while cursor < actions.len() {
                ticker.tick().await;
                let elapsed = origin.elapsed();

                // Fire every action whose offset has been reached, in order.
                // A late action still fires; nothing is ever skipped.
                while cursor < actions.len() && offsets[cursor] <= elapsed {
                    let action = &actions[cursor];
                    match instruments.get(&action.button) {
                        Some(sound) => {
                            target.trigger_with(action.button, sound.clone(), token.clone());
                        }
                        None => {
                            debug!(
                                "Skipping button {}: no instrument in snapshot",
                                action.button
                            );
                        }
                    }
                    cursor += 1;
                }
            }

            // Stopped sessions lose the race to report completion. `stop`
            // invalidates the token while holding this lock, so checking
            // liveness under it means a stopped session can never flip the
            // status back to Finished afterwards.
            let mut inner = shared.lock().unwrap_or_else(|e| e.into_inner());
            if token.is_live() {
                inner.status = ReplayStatus::Finished { recording_id };
                inner.task = None;
                info!("Replay of {} finished", recording_id);
                events.emit(PadEvent::ReplayFinished {
                    recording_id,
                    timestamp: chrono::Utc::now(),
                });
            }
        }));
    }

    /// Stop the active session
    ///
    /// Idempotent; a no-op unless currently playing. After this returns no
    /// further trigger fires, including fetches already in flight.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Self::halt_session(&self.generation, &self.events, &mut inner);
    }

    fn halt_session(generation: &SessionGeneration, events: &EventBus, inner: &mut Inner) {
        let ReplayStatus::Playing { recording_id } = inner.status else {
            return;
        };
        // Invalidate first: an in-flight trigger checks the token after its
        // fetch completes, so no sound from this session plays past here.
        generation.invalidate();
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        inner.status = ReplayStatus::Idle;
        info!("Replay of {} stopped", recording_id);
        events.emit(PadEvent::ReplayStopped {
            recording_id,
            timestamp: chrono::Utc::now(),
        });
    }
}

impl Drop for ReplayScheduler {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            if let Some(task) = inner.task.take() {
                task.abort();
            }
        }
    }
}
