//! Catalog API client
//!
//! Talks to a YouTube Data API v3 compatible endpoint through the host's
//! `HttpClient`. Search hits are joined with a single batched details
//! lookup to produce [`CatalogTrack`]s.

use std::sync::Arc;

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, RetryPolicy};
use core_runtime::config::CatalogSettings;
use core_runtime::logging::redact_query_param;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::{CatalogError, Result};
use crate::types::{
    ApiErrorResponse, CatalogTrack, SearchListResponse, SearchResult, VideoDetails,
    VideoListResponse,
};

/// Query words that already mark a search as music related.
const MUSIC_KEYWORDS: &[&str] = &["song", "music", "audio", "lyrics", "instrumental"];

/// Music category id on the video host.
const MUSIC_CATEGORY_ID: u32 = 10;

/// Source of playable catalog entries.
#[async_trait]
pub trait TrackCatalog: Send + Sync {
    /// Searches and resolves details, preserving hit order.
    async fn resolve(&self, query: &str) -> Result<Vec<CatalogTrack>>;
}

/// Catalog API client
///
/// Errors are surfaced as-is; the client never retries.
///
/// # Example
///
/// ```ignore
/// use core_catalog::CatalogClient;
///
/// let client = CatalogClient::new(http_client, settings)?;
/// let tracks = client.resolve("daft punk").await?;
/// ```
pub struct CatalogClient {
    http_client: Arc<dyn HttpClient>,
    settings: CatalogSettings,
}

impl CatalogClient {
    /// Fails with `NotConfigured` when the settings carry no API key.
    pub fn new(http_client: Arc<dyn HttpClient>, settings: CatalogSettings) -> Result<Self> {
        let has_key = settings
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty());
        if !has_key {
            return Err(CatalogError::NotConfigured(
                "catalog API key is missing".to_string(),
            ));
        }

        Ok(Self {
            http_client,
            settings,
        })
    }

    /// Appends `" music"` unless the query already names a music keyword.
    pub fn music_query(query: &str) -> String {
        let lower = query.to_lowercase();
        if MUSIC_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
            query.to_string()
        } else {
            format!("{} music", query)
        }
    }

    fn api_key(&self) -> String {
        let key = self.settings.api_key.as_deref().unwrap_or_default();
        urlencoding::encode(key).into_owned()
    }

    fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    /// Music-category search. Hits that are not videos are dropped.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/search?part=snippet&maxResults={}&q={}&type=video&videoCategoryId={}&videoEmbeddable=true&key={}",
            self.base_url(),
            self.settings.max_results,
            urlencoding::encode(&Self::music_query(query)),
            MUSIC_CATEGORY_ID,
            self.api_key(),
        );

        let response: SearchListResponse = self
            .get_json(url, "Failed to fetch search results")
            .await?;
        let hits: Vec<SearchResult> = response
            .items
            .into_iter()
            .filter(|item| item.id.video_id.as_deref().is_some_and(|id| !id.is_empty()))
            .collect();

        debug!(hits = hits.len(), "Catalog search complete");
        Ok(hits)
    }

    /// Batched details lookup. No request is made for an empty id list.
    #[instrument(skip(self), fields(count = ids.len()))]
    pub async fn video_details(&self, ids: &[String]) -> Result<Vec<VideoDetails>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(|id| urlencoding::encode(id).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        let url = format!(
            "{}/videos?part=snippet,contentDetails,statistics&id={}&key={}",
            self.base_url(),
            joined,
            self.api_key(),
        );

        let response: VideoListResponse = self
            .get_json(url, "Failed to fetch video details")
            .await?;
        Ok(response.items)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, fallback: &str) -> Result<T> {
        debug!(url = %redact_query_param(&url, "key"), "Catalog request");

        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Accept", "application/json")
            .timeout(self.settings.request_timeout());
        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::no_retry())
            .await?;

        if !response.is_success() {
            let message = serde_json::from_slice::<ApiErrorResponse>(&response.body)
                .ok()
                .map(|body| body.error.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| fallback.to_string());
            warn!(status = response.status, message = %message, "Catalog API error");
            return Err(CatalogError::Api {
                status: response.status,
                message,
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }
}

#[async_trait]
impl TrackCatalog for CatalogClient {
    async fn resolve(&self, query: &str) -> Result<Vec<CatalogTrack>> {
        let hits = self.search(query).await?;
        let ids: Vec<String> = hits
            .iter()
            .filter_map(|hit| hit.id.video_id.clone())
            .collect();
        let details = self.video_details(&ids).await?;

        let tracks: Vec<CatalogTrack> = hits
            .into_iter()
            .filter_map(|hit| {
                let media_id = hit.id.video_id?;
                let detail = details.iter().find(|d| d.id == media_id);
                Some(CatalogTrack {
                    title: hit.snippet.title,
                    artist: hit.snippet.channel_title,
                    thumbnail_url: hit.snippet.thumbnails.best_url(),
                    raw_duration: detail
                        .map(|d| d.content_details.duration.clone())
                        .unwrap_or_else(|| "PT0S".to_string()),
                    raw_view_count: detail
                        .map(|d| d.statistics.view_count.clone())
                        .unwrap_or_default(),
                    external_media_id: media_id,
                })
            })
            .collect();

        info!(query, results = tracks.len(), "Resolved catalog search");
        Ok(tracks)
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("settings", &self.settings)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_music_query_appends_keyword() {
        assert_eq!(CatalogClient::music_query("daft punk"), "daft punk music");
        assert_eq!(CatalogClient::music_query("Lofi Beats AUDIO"), "Lofi Beats AUDIO");
        assert_eq!(
            CatalogClient::music_query("piano instrumental"),
            "piano instrumental"
        );
        // Substring match, as with "songbird".
        assert_eq!(CatalogClient::music_query("songbird"), "songbird");
    }
}
