//! Domain model for the pad service
//!
//! A pad session revolves around three things: live button presses arriving
//! from the controller, a mutable button-to-sound assignment table, and saved
//! `Recording` entities that freeze a timed press sequence together with a
//! snapshot of that table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Number of physical pads on the controller (buttons are 1..=BUTTON_COUNT)
pub const BUTTON_COUNT: u8 = 4;

/// A single timestamped button press
///
/// Immutable once created. Produced by the command channel (or synthetically
/// by the API) and consumed by the event recorder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButtonAction {
    /// Wall-clock instant of the press
    pub timestamp: DateTime<Utc>,
    /// Button identifier (1..=BUTTON_COUNT)
    pub button: u8,
}

impl ButtonAction {
    /// Create an action stamped with the current time
    pub fn now(button: u8) -> Self {
        Self {
            timestamp: Utc::now(),
            button,
        }
    }
}

/// Reference to a remote audio asset as a (folder, file) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundRef {
    pub folder: String,
    pub file: String,
}

impl SoundRef {
    pub fn new(folder: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            file: file.into(),
        }
    }

    /// Parse a "folder/file" path as stored by the original arrangement UI
    pub fn parse(path: &str) -> Option<Self> {
        let (folder, file) = path.split_once('/')?;
        if folder.is_empty() || file.is_empty() {
            return None;
        }
        Some(Self::new(folder, file))
    }
}

impl std::fmt::Display for SoundRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.folder, self.file)
    }
}

/// Button-to-sound assignment table
///
/// BTreeMap keeps API responses in button order.
pub type SoundAssignments = BTreeMap<u8, SoundRef>;

/// A saved pad performance
///
/// `actions` preserves capture (append) order; replay re-sorts by timestamp.
/// `instruments` is the assignment snapshot taken when the recording was
/// finalized, so later edits to the live table never alter a saved take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub actions: Vec<ButtonAction>,
    pub instruments: SoundAssignments,
}

impl Recording {
    /// Build a new recording from captured actions and an assignment snapshot
    pub fn new(name: Option<String>, actions: Vec<ButtonAction>, instruments: SoundAssignments) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.unwrap_or_else(|| "Untitled".to_string()),
            created_at: Utc::now(),
            actions,
            instruments,
        }
    }

    /// Copy of the actions in replay order (stable sort, capture order breaks ties)
    pub fn sorted_actions(&self) -> Vec<ButtonAction> {
        let mut sorted = self.actions.clone();
        sorted.sort_by_key(|a| a.timestamp);
        sorted
    }
}
