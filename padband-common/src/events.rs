//! Event types for the PadBand event system
//!
//! Provides shared event definitions and the EventBus used to fan events out
//! to the SSE endpoint and any in-process listeners.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// PadBand event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PadEvent {
    /// Controller connectivity changed
    ///
    /// Triggers:
    /// - SSE: Update connection indicator
    ConnectionChanged {
        /// Whether the controller is connected
        connected: bool,
        /// When connectivity changed
        timestamp: DateTime<Utc>,
    },

    /// A button press was delivered (physical or synthetic)
    ///
    /// Triggers:
    /// - Recorder: Append action while recording
    /// - Resolver: Live play-along trigger
    /// - SSE: Flash the pressed pad
    ButtonPressed {
        /// Button identifier (1..=BUTTON_COUNT)
        button: u8,
        /// When the press was delivered
        timestamp: DateTime<Utc>,
    },

    /// Recording mode entered
    RecordingStarted {
        /// When recording started
        timestamp: DateTime<Utc>,
    },

    /// Recording mode left and the take was persisted
    ///
    /// Triggers:
    /// - SSE: Refresh recordings list
    RecordingSaved {
        /// Persisted recording UUID
        recording_id: Uuid,
        /// Recording name
        name: String,
        /// Number of captured actions
        action_count: usize,
        /// When the recording was saved
        timestamp: DateTime<Utc>,
    },

    /// Replay of a saved recording started
    ReplayStarted {
        /// Recording UUID being replayed
        recording_id: Uuid,
        /// Number of actions scheduled
        action_count: usize,
        /// When replay started
        timestamp: DateTime<Utc>,
    },

    /// Replay ran to completion (all actions fired)
    ReplayFinished {
        /// Recording UUID that finished
        recording_id: Uuid,
        /// When replay finished
        timestamp: DateTime<Utc>,
    },

    /// Replay was stopped before completion
    ReplayStopped {
        /// Recording UUID that was stopped
        recording_id: Uuid,
        /// When replay was stopped
        timestamp: DateTime<Utc>,
    },

    /// A sound trigger failed (asset fetch error)
    ///
    /// Recovered locally; the sequence continues without this sound.
    TriggerFailed {
        /// Button whose trigger failed
        button: u8,
        /// Failure description
        error: String,
        /// When the failure occurred
        timestamp: DateTime<Utc>,
    },
}

impl PadEvent {
    /// Event type string used as the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            PadEvent::ConnectionChanged { .. } => "ConnectionChanged",
            PadEvent::ButtonPressed { .. } => "ButtonPressed",
            PadEvent::RecordingStarted { .. } => "RecordingStarted",
            PadEvent::RecordingSaved { .. } => "RecordingSaved",
            PadEvent::ReplayStarted { .. } => "ReplayStarted",
            PadEvent::ReplayFinished { .. } => "ReplayFinished",
            PadEvent::ReplayStopped { .. } => "ReplayStopped",
            PadEvent::TriggerFailed { .. } => "TriggerFailed",
        }
    }
}

/// Broadcast bus for PadEvents
///
/// Thin wrapper over `tokio::sync::broadcast`. Emitting with no subscribers
/// is not an error; events are simply dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PadEvent>,
}

impl EventBus {
    /// Create a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PadEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: PadEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_type_tag() {
        let event = PadEvent::ButtonPressed {
            button: 2,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ButtonPressed\""));
        assert!(json.contains("\"button\":2"));

        let back: PadEvent = serde_json::from_str(&json).unwrap();
        match back {
            PadEvent::ButtonPressed { button, .. } => assert_eq!(button, 2),
            other => panic!("wrong event type deserialized: {:?}", other),
        }
    }

    #[test]
    fn event_type_matches_variant() {
        let event = PadEvent::ReplayFinished {
            recording_id: Uuid::new_v4(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type(), "ReplayFinished");
    }

    #[tokio::test]
    async fn bus_delivers_to_subscriber() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();
        bus.emit(PadEvent::RecordingStarted {
            timestamp: Utc::now(),
        });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type(), "RecordingStarted");
    }

    #[test]
    fn emit_without_subscribers_is_ok() {
        let bus = EventBus::new(10);
        bus.emit(PadEvent::ConnectionChanged {
            connected: true,
            timestamp: Utc::now(),
        });
    }
}
