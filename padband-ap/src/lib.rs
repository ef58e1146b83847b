//! # PadBand Pad Service
//!
//! Pairs with a BLE pad controller, triggers remote-hosted audio clips per
//! button, records timed button sequences and replays them deterministically.
//!
//! Core data flow: the command channel emits typed button presses; while
//! recording mode is active the event recorder appends them; stopping
//! finalizes a `Recording` (actions + assignment snapshot) into the store;
//! the replay scheduler later drives the sound resolver at the original
//! relative offsets against a fresh time origin.

pub mod api;
pub mod channel;
pub mod engine;
pub mod recorder;
pub mod replay;
pub mod resolver;
pub mod sounds;
pub mod store;
