//! Command channel
//!
//! Abstracts the BLE transport into a typed stream of button presses plus a
//! connectivity flag. The transport itself (scanning, reconnect policy, UART
//! characteristic plumbing) lives outside this crate; whatever drives it
//! calls `deliver` with the raw single-character tokens the controller sends
//! and `set_connected` on link state changes. The API's synthetic press
//! endpoint goes through the same path.

use padband_common::events::{EventBus, PadEvent};
use padband_common::model::{ButtonAction, BUTTON_COUNT};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Typed inbound event stream over the BLE collaborator
pub struct CommandChannel {
    connected: AtomicBool,
    press_tx: broadcast::Sender<ButtonAction>,
    events: Arc<EventBus>,
}

impl CommandChannel {
    pub fn new(events: Arc<EventBus>) -> Self {
        let (press_tx, _) = broadcast::channel(64);
        Self {
            connected: AtomicBool::new(false),
            press_tx,
            events,
        }
    }

    /// Whether the controller link is currently up
    pub fn connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Record a link state change reported by the transport
    pub fn set_connected(&self, connected: bool) {
        let previous = self.connected.swap(connected, Ordering::AcqRel);
        if previous != connected {
            info!("Controller {}", if connected { "connected" } else { "disconnected" });
            self.events.emit(PadEvent::ConnectionChanged {
                connected,
                timestamp: chrono::Utc::now(),
            });
        }
    }

    /// Subscribe to the typed button press stream
    pub fn subscribe(&self) -> broadcast::Receiver<ButtonAction> {
        self.press_tx.subscribe()
    }

    /// Deliver a raw token from the transport
    ///
    /// The controller firmware writes one character per press: letters
    /// 'A'..'D' (one per pad) or digits '1'..'4'. Anything else is logged
    /// and dropped. Upstream duplicates are treated as separate presses.
    ///
    /// Returns the button number the token mapped to, if any.
    pub fn deliver(&self, token: char) -> Option<u8> {
        let button = parse_token(token)?;
        self.press(button)
    }

    /// Deliver a press that is already a button number (synthetic UI path)
    pub fn press(&self, button: u8) -> Option<u8> {
        if !(1..=BUTTON_COUNT).contains(&button) {
            debug!("Ignoring out-of-range button {}", button);
            return None;
        }
        let action = ButtonAction::now(button);
        self.events.emit(PadEvent::ButtonPressed {
            button,
            timestamp: action.timestamp,
        });
        // No subscribers yet is fine; presses before the engine task starts
        // are simply dropped.
        let _ = self.press_tx.send(action);
        Some(button)
    }
}

/// Map a controller token to a button number
fn parse_token(token: char) -> Option<u8> {
    match token {
        'A'..='D' => Some(token as u8 - b'A' + 1),
        '1'..='4' => Some(token as u8 - b'0'),
        other => {
            debug!("Ignoring unknown token {:?}", other);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> CommandChannel {
        CommandChannel::new(Arc::new(EventBus::new(16)))
    }

    #[test]
    fn parses_letter_and_digit_tokens() {
        assert_eq!(parse_token('A'), Some(1));
        assert_eq!(parse_token('B'), Some(2));
        assert_eq!(parse_token('D'), Some(4));
        assert_eq!(parse_token('1'), Some(1));
        assert_eq!(parse_token('4'), Some(4));
        assert_eq!(parse_token('E'), None);
        assert_eq!(parse_token('0'), None);
        assert_eq!(parse_token('x'), None);
    }

    #[tokio::test]
    async fn deliver_broadcasts_typed_press() {
        let ch = channel();
        let mut rx = ch.subscribe();
        assert_eq!(ch.deliver('B'), Some(2));
        let action = rx.recv().await.unwrap();
        assert_eq!(action.button, 2);
    }

    #[tokio::test]
    async fn duplicate_tokens_are_separate_presses() {
        let ch = channel();
        let mut rx = ch.subscribe();
        ch.deliver('A');
        ch.deliver('A');
        assert_eq!(rx.recv().await.unwrap().button, 1);
        assert_eq!(rx.recv().await.unwrap().button, 1);
    }

    #[test]
    fn out_of_range_press_is_dropped() {
        let ch = channel();
        assert_eq!(ch.press(0), None);
        assert_eq!(ch.press(5), None);
    }

    #[tokio::test]
    async fn connection_flag_and_event() {
        let events = Arc::new(EventBus::new(16));
        let ch = CommandChannel::new(events.clone());
        let mut rx = events.subscribe();

        assert!(!ch.connected());
        ch.set_connected(true);
        assert!(ch.connected());

        match rx.recv().await.unwrap() {
            PadEvent::ConnectionChanged { connected, .. } => assert!(connected),
            other => panic!("unexpected event: {:?}", other),
        }

        // Repeated set with same value emits nothing further
        ch.set_connected(true);
        assert!(rx.try_recv().is_err());
    }
}
