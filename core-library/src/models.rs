//! Offline library models
//!
//! Records are stored as JSON values keyed by the external media id.

use chrono::{DateTime, Utc};
use core_playback::Track;
use serde::{Deserialize, Serialize};

/// What the caller supplies when saving a track for offline use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineEntry {
    /// External media id; also the storage key.
    pub id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail: String,
    /// Display duration, e.g. `"3:33"`.
    pub duration: String,
}

impl OfflineEntry {
    /// Validate entry data
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("Offline entry id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Offline entry title cannot be empty".to_string());
        }

        Ok(())
    }
}

impl From<&Track> for OfflineEntry {
    fn from(track: &Track) -> Self {
        Self {
            id: track.external_media_id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            thumbnail: track.thumbnail_url.clone(),
            duration: track.duration.clone(),
        }
    }
}

/// A saved entry with its save time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineRecord {
    #[serde(flatten)]
    pub entry: OfflineEntry,
    pub added_at: DateTime<Utc>,
}

impl OfflineRecord {
    pub fn id(&self) -> &str {
        &self.entry.id
    }
}
