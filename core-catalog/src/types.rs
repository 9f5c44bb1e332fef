//! Catalog API response types
//!
//! Only the fields the client reads are modelled; everything else in the
//! payload is ignored.

use core_playback::Track;
use serde::{Deserialize, Serialize};

use crate::format::{format_duration, format_view_count};

/// `search` response envelope.
#[derive(Debug, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub id: SearchResultId,
    pub snippet: Snippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultId {
    #[serde(default)]
    pub kind: String,
    /// Absent for channel and playlist hits.
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    pub default: Option<Thumbnail>,
    pub medium: Option<Thumbnail>,
    pub high: Option<Thumbnail>,
}

impl Thumbnails {
    /// Medium when present, otherwise the closest available size.
    pub fn best_url(&self) -> String {
        self.medium
            .as_ref()
            .or(self.high.as_ref())
            .or(self.default.as_ref())
            .map(|thumbnail| thumbnail.url.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// `videos` response envelope.
#[derive(Debug, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoDetails>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub id: String,
    #[serde(default)]
    pub snippet: Snippet,
    #[serde(default)]
    pub content_details: ContentDetails,
    #[serde(default)]
    pub statistics: Statistics,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentDetails {
    /// ISO 8601, e.g. `PT3M33S`.
    #[serde(default)]
    pub duration: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Decimal string; the API never sends a number here.
    #[serde(default)]
    pub view_count: String,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
}

/// A search hit joined with its details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrack {
    pub external_media_id: String,
    pub title: String,
    pub artist: String,
    pub thumbnail_url: String,
    /// ISO 8601 duration as returned by the API.
    pub raw_duration: String,
    /// Empty when details were missing.
    pub raw_view_count: String,
}

impl From<CatalogTrack> for Track {
    /// Formats the raw duration and view count for display. A missing view
    /// count stays `None`.
    fn from(hit: CatalogTrack) -> Self {
        let views = (!hit.raw_view_count.is_empty()).then(|| format_view_count(&hit.raw_view_count));
        Track {
            id: hit.external_media_id.clone(),
            duration: format_duration(&hit.raw_duration),
            external_media_id: hit.external_media_id,
            title: hit.title,
            artist: hit.artist,
            thumbnail_url: hit.thumbnail_url,
            views,
            audio_only: None,
        }
    }
}
