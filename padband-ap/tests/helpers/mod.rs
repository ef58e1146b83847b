//! Shared test doubles for the pad service integration tests
//!
//! Provides an in-memory sound store with configurable latency and failures,
//! a sink that records plays with their timing, and a trigger target that
//! records fire order for replay scheduling tests.

// Not every integration test file uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use padband_ap::replay::TriggerTarget;
use padband_ap::resolver::SessionToken;
use padband_ap::sounds::{AudioSink, SoundStore};
use padband_common::model::SoundRef;
use padband_common::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// In-memory sound store
///
/// `delay` simulates network latency per fetch (driven by the tokio clock,
/// so paused-time tests stay deterministic). Sounds listed in `failing`
/// return a fetch error.
pub struct MockSoundStore {
    origin: Instant,
    delay: Duration,
    sounds: Mutex<HashMap<String, Vec<u8>>>,
    failing: Mutex<Vec<String>>,
    pub fetches: Mutex<Vec<(String, Duration)>>,
}

impl MockSoundStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            origin: Instant::now(),
            delay,
            sounds: Mutex::new(HashMap::new()),
            failing: Mutex::new(Vec::new()),
            fetches: Mutex::new(Vec::new()),
        }
    }

    pub fn add_sound(&self, sound: &SoundRef, bytes: Vec<u8>) {
        self.sounds.lock().unwrap().insert(sound.to_string(), bytes);
    }

    pub fn fail_on(&self, sound: &SoundRef) {
        self.failing.lock().unwrap().push(sound.to_string());
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

#[async_trait]
impl SoundStore for MockSoundStore {
    async fn list_folders(&self) -> Result<Vec<String>> {
        let mut folders: Vec<String> = self
            .sounds
            .lock()
            .unwrap()
            .keys()
            .filter_map(|path| path.split('/').next().map(str::to_string))
            .collect();
        folders.sort();
        folders.dedup();
        Ok(folders)
    }

    async fn list_files(&self, folder: &str) -> Result<Vec<String>> {
        let prefix = format!("{}/", folder);
        let mut files: Vec<String> = self
            .sounds
            .lock()
            .unwrap()
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix).map(str::to_string))
            .collect();
        files.sort();
        Ok(files)
    }

    async fn fetch_audio(&self, sound: &SoundRef) -> Result<Vec<u8>> {
        self.fetches
            .lock()
            .unwrap()
            .push((sound.to_string(), self.origin.elapsed()));

        tokio::time::sleep(self.delay).await;

        if self.failing.lock().unwrap().contains(&sound.to_string()) {
            return Err(Error::Fetch(format!("{} unavailable", sound)));
        }
        self.sounds
            .lock()
            .unwrap()
            .get(&sound.to_string())
            .cloned()
            .ok_or_else(|| Error::Fetch(format!("{} not found", sound)))
    }
}

/// Sink recording every play/stop with its timing
pub struct MockSink {
    origin: Instant,
    pub plays: Mutex<Vec<(u8, Vec<u8>, Duration)>>,
    pub stops: Mutex<Vec<u8>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            plays: Mutex::new(Vec::new()),
            stops: Mutex::new(Vec::new()),
        }
    }

    pub fn played_buttons(&self) -> Vec<u8> {
        self.plays.lock().unwrap().iter().map(|(b, _, _)| *b).collect()
    }
}

#[async_trait]
impl AudioSink for MockSink {
    async fn play(&self, button: u8, bytes: Vec<u8>) {
        self.plays
            .lock()
            .unwrap()
            .push((button, bytes, self.origin.elapsed()));
    }

    async fn stop(&self, button: u8) {
        self.stops.lock().unwrap().push(button);
    }
}

/// Trigger target that records fire order and timing without any I/O
pub struct RecordingTarget {
    origin: Instant,
    pub fired: Mutex<Vec<(u8, Duration)>>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            fired: Mutex::new(Vec::new()),
        }
    }

    pub fn fired_buttons(&self) -> Vec<u8> {
        self.fired.lock().unwrap().iter().map(|(b, _)| *b).collect()
    }
}

impl TriggerTarget for RecordingTarget {
    fn trigger_with(&self, button: u8, _sound: SoundRef, _session: SessionToken) {
        self.fired.lock().unwrap().push((button, self.origin.elapsed()));
    }
}
