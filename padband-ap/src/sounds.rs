//! Remote sound store and audio output collaborators
//!
//! Both sides of a trigger are external to this crate: the asset bytes come
//! from a remote store and go to an audio output device. Each is a trait so
//! the resolver and replay machinery can be exercised without a network or a
//! sound card.

use async_trait::async_trait;
use padband_common::model::SoundRef;
use padband_common::{Error, Result};
use tracing::{debug, info};

/// Largest asset the store will hand back (matches the original 5 MiB cap)
pub const MAX_SOUND_BYTES: usize = 5 * 1024 * 1024;

/// Remote sound asset store
///
/// Folder/file listing backs the arrangement browser; `fetch_audio` is the
/// per-trigger download. All operations are fallible and network-bound.
#[async_trait]
pub trait SoundStore: Send + Sync {
    /// List top-level sound folders
    async fn list_folders(&self) -> Result<Vec<String>>;

    /// List sound files within a folder
    async fn list_files(&self, folder: &str) -> Result<Vec<String>>;

    /// Fetch the raw bytes of one sound asset
    async fn fetch_audio(&self, sound: &SoundRef) -> Result<Vec<u8>>;
}

/// Audio output device with one playback slot per button
///
/// A slot holds at most one sounding clip; `play` on an occupied slot
/// replaces the previous clip. Different buttons sound concurrently.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Start playing `bytes` on the button's slot
    async fn play(&self, button: u8, bytes: Vec<u8>);

    /// Stop whatever the button's slot is currently playing
    async fn stop(&self, button: u8);
}

/// HTTP-backed sound store
///
/// Expects the store to expose:
/// - `GET {base}/sounds` → JSON array of folder names
/// - `GET {base}/sounds/{folder}` → JSON array of file names
/// - `GET {base}/sounds/{folder}/{file}` → asset bytes
pub struct HttpSoundStore {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl HttpSoundStore {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = reqwest::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid sound store URL: {}", e)))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
        })
    }

    /// Build a URL under /sounds, percent-encoding each path segment
    /// (file names like "Tap (1).wav" contain spaces)
    fn sounds_url(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::Config("Sound store URL cannot be a base".to_string()))?;
            path.push("sounds");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn get_string_list(&self, url: reqwest::Url) -> Result<Vec<String>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Fetch(format!("HTTP {}", response.status())));
        }
        response
            .json::<Vec<String>>()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))
    }
}

#[async_trait]
impl SoundStore for HttpSoundStore {
    async fn list_folders(&self) -> Result<Vec<String>> {
        self.get_string_list(self.sounds_url(&[])?).await
    }

    async fn list_files(&self, folder: &str) -> Result<Vec<String>> {
        self.get_string_list(self.sounds_url(&[folder])?).await
    }

    async fn fetch_audio(&self, sound: &SoundRef) -> Result<Vec<u8>> {
        let url = self.sounds_url(&[&sound.folder, &sound.file])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(Error::Fetch(format!("HTTP {} for {}", response.status(), sound)));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Fetch(e.to_string()))?;
        if bytes.len() > MAX_SOUND_BYTES {
            return Err(Error::Fetch(format!(
                "{} exceeds {} byte limit",
                sound, MAX_SOUND_BYTES
            )));
        }
        debug!("Fetched {} ({} bytes)", sound, bytes.len());
        Ok(bytes.to_vec())
    }
}

/// Sink that logs plays instead of producing audio
///
/// Codec handling and device output belong to the platform audio collaborator;
/// this is the default when the service runs headless.
pub struct LogSink;

#[async_trait]
impl AudioSink for LogSink {
    async fn play(&self, button: u8, bytes: Vec<u8>) {
        info!("play: button {} ({} bytes)", button, bytes.len());
    }

    async fn stop(&self, button: u8) {
        debug!("stop: button {}", button);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sounds_url_encodes_segments() {
        let store = HttpSoundStore::new("http://localhost:9000").unwrap();
        let url = store
            .sounds_url(&["taps", "Tap (1).wav"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/sounds/taps/Tap%20(1).wav"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(HttpSoundStore::new("not a url").is_err());
    }
}
