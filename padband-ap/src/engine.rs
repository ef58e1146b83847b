//! Pad engine
//!
//! Owns the session: command channel, sound resolver, event recorder, replay
//! scheduler and recording store, plus the routing task that fans every
//! inbound press out to the recorder (no-op while idle) and the live
//! play-along trigger path.

use crate::channel::CommandChannel;
use crate::recorder::{EventRecorder, RecorderState};
use crate::replay::{ReplayScheduler, ReplayStatus};
use crate::resolver::SoundResolver;
use crate::sounds::{AudioSink, SoundStore};
use crate::store::RecordingStore;
use padband_common::events::{EventBus, PadEvent};
use padband_common::model::Recording;
use padband_common::{Error, Result};
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

/// Aggregate status for the API
#[derive(Debug, Clone)]
pub struct EngineStatus {
    pub connected: bool,
    pub recorder: RecorderState,
    pub pending_actions: usize,
    pub replay: ReplayStatus,
}

pub struct PadEngine {
    channel: Arc<CommandChannel>,
    resolver: Arc<SoundResolver>,
    recorder: Arc<EventRecorder>,
    scheduler: ReplayScheduler,
    store: RecordingStore,
    sounds: Arc<dyn SoundStore>,
    events: Arc<EventBus>,
    routing_task: Mutex<Option<JoinHandle<()>>>,
}

impl PadEngine {
    /// Wire up the engine and start the press routing task
    pub fn new(
        pool: SqlitePool,
        sounds: Arc<dyn SoundStore>,
        sink: Arc<dyn AudioSink>,
    ) -> Arc<Self> {
        let events = Arc::new(EventBus::new(100));
        let channel = Arc::new(CommandChannel::new(Arc::clone(&events)));
        let resolver = Arc::new(SoundResolver::new(
            Arc::clone(&sounds),
            sink,
            Arc::clone(&events),
        ));
        let recorder = Arc::new(EventRecorder::new());
        let trigger_target = Arc::clone(&resolver) as Arc<dyn crate::replay::TriggerTarget>;
        let scheduler = ReplayScheduler::new(trigger_target, Arc::clone(&events));
        let store = RecordingStore::new(pool);

        let engine = Arc::new(Self {
            channel,
            resolver,
            recorder,
            scheduler,
            store,
            sounds,
            events,
            routing_task: Mutex::new(None),
        });

        engine.spawn_routing_task();
        engine
    }

    /// Route presses: while recording append to the buffer, and always fire
    /// the live trigger so the player hears what they press
    fn spawn_routing_task(self: &Arc<Self>) {
        let mut presses = self.channel.subscribe();
        let recorder = Arc::clone(&self.recorder);
        let resolver = Arc::clone(&self.resolver);

        let task = tokio::spawn(async move {
            loop {
                match presses.recv().await {
                    Ok(action) => {
                        recorder.record(action);
                        resolver.trigger(action.button);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // A press burst overran the channel buffer; drop what
                        // was lost and keep routing.
                        warn!("Press routing lagged, {} presses skipped", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        *self.routing_task.lock().unwrap_or_else(|e| e.into_inner()) = Some(task);
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn channel(&self) -> &Arc<CommandChannel> {
        &self.channel
    }

    pub fn resolver(&self) -> &Arc<SoundResolver> {
        &self.resolver
    }

    pub fn sounds(&self) -> &Arc<dyn SoundStore> {
        &self.sounds
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            connected: self.channel.connected(),
            recorder: self.recorder.state(),
            pending_actions: self.recorder.pending_count(),
            replay: self.scheduler.status(),
        }
    }

    /// Enter recording mode
    pub fn start_recording(&self) -> Result<()> {
        if !self.recorder.start() {
            return Err(Error::InvalidInput("Already recording".to_string()));
        }
        info!("Recording started");
        self.events.emit(PadEvent::RecordingStarted {
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    /// Leave recording mode, snapshot the assignment table and persist
    pub async fn stop_recording(&self, name: Option<String>) -> Result<Recording> {
        let recording = self
            .recorder
            .stop(name, self.resolver.snapshot())
            .ok_or_else(|| Error::InvalidInput("Not recording".to_string()))?;

        self.store.create(&recording).await?;
        info!(
            "Recording {} saved: {} actions",
            recording.id,
            recording.actions.len()
        );
        self.events.emit(PadEvent::RecordingSaved {
            recording_id: recording.id,
            name: recording.name.clone(),
            action_count: recording.actions.len(),
            timestamp: chrono::Utc::now(),
        });
        Ok(recording)
    }

    pub async fn list_recordings(&self) -> Result<Vec<Recording>> {
        self.store.list().await
    }

    pub async fn rename_recording(&self, id: Uuid, new_name: &str) -> Result<()> {
        if new_name.trim().is_empty() {
            return Err(Error::InvalidInput("Name cannot be empty".to_string()));
        }
        self.store.rename(id, new_name).await
    }

    pub async fn delete_recording(&self, id: Uuid) -> Result<()> {
        // A deleted recording must not keep playing.
        if let ReplayStatus::Playing { recording_id } = self.scheduler.status() {
            if recording_id == id {
                self.scheduler.stop();
            }
        }
        self.store.delete(id).await
    }

    /// Start replaying a stored recording (supersedes any active replay)
    pub async fn play_recording(&self, id: Uuid) -> Result<()> {
        let recording = self.store.get(id).await?;
        self.scheduler.start(&recording);
        Ok(())
    }

    pub fn stop_replay(&self) {
        self.scheduler.stop();
    }

    /// Stop replay and the routing task (process shutdown)
    pub fn shutdown(&self) {
        self.scheduler.stop();
        if let Some(task) = self.routing_task.lock().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }
    }
}
