//! # PadBand Common Library
//!
//! Shared code for the PadBand pad service including:
//! - Domain model (recordings, button actions, sound references)
//! - Event types (PadEvent enum) and EventBus
//! - Configuration loading
//! - Database initialization
//! - Utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod model;
pub mod time;

pub use error::{Error, Result};
pub use model::{ButtonAction, Recording, SoundAssignments, SoundRef, BUTTON_COUNT};
