//! Playback domain types shared by the store, the adapter and the service.

use serde::{Deserialize, Serialize};

/// A playable item in the catalog.
///
/// `id` identifies the item within the app; `external_media_id` is what the
/// media engine loads. The two are usually equal for catalog results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub external_media_id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail_url: String,
    /// Human readable duration, e.g. `"3:33"`.
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub views: Option<String>,
    /// Per-track audio-only override. `None` keeps the current mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_only: Option<bool>,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        external_media_id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            external_media_id: external_media_id.into(),
            title: title.into(),
            artist: artist.into(),
            thumbnail_url: String::new(),
            duration: String::new(),
            views: None,
            audio_only: None,
        }
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = url.into();
        self
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = duration.into();
        self
    }

    pub fn with_views(mut self, views: impl Into<String>) -> Self {
        self.views = Some(views.into());
        self
    }

    pub fn with_audio_only(mut self, audio_only: bool) -> Self {
        self.audio_only = Some(audio_only);
        self
    }

    /// Whether the engine has anything to load for this track.
    pub fn is_playable(&self) -> bool {
        !self.external_media_id.trim().is_empty()
    }
}

/// Coarse transport state derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    /// No current track.
    Idle,
    Paused,
    Playing,
}

/// Complete player state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub current_track: Option<Track>,
    /// Position of the current track in `queue`, if it came from there.
    pub current_index: Option<usize>,
    pub queue: Vec<Track>,
    pub is_playing: bool,
    pub is_audio_only: bool,
    /// Nominally 0..=100. Clamped only where it reaches the engine.
    pub volume: i32,
    /// Seconds.
    pub current_time: f64,
    /// Seconds. 0 until the engine reports a duration.
    pub duration: f64,
}

impl PlaybackSnapshot {
    pub fn new(volume: i32, audio_only: bool) -> Self {
        Self {
            current_track: None,
            current_index: None,
            queue: Vec::new(),
            is_playing: false,
            is_audio_only: audio_only,
            volume,
            current_time: 0.0,
            duration: 0.0,
        }
    }

    pub fn transport_state(&self) -> TransportState {
        match (&self.current_track, self.is_playing) {
            (None, _) => TransportState::Idle,
            (Some(_), true) => TransportState::Playing,
            (Some(_), false) => TransportState::Paused,
        }
    }

    /// What the engine should be doing right now.
    pub fn desired(&self) -> DesiredPlayback {
        DesiredPlayback {
            media_id: self
                .current_track
                .as_ref()
                .filter(|track| track.is_playable())
                .map(|track| track.external_media_id.clone()),
            playing: self.is_playing,
            volume: self.volume,
            audio_only: self.is_audio_only,
            position: self.current_time,
        }
    }
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self::new(80, false)
    }
}

/// The slice of a snapshot the engine adapter reconciles against.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredPlayback {
    pub media_id: Option<String>,
    pub playing: bool,
    pub volume: i32,
    pub audio_only: bool,
    pub position: f64,
}
