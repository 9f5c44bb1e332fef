//! Share flow for the current track.
//!
//! Prefers the platform share sheet and falls back to copying the link to
//! the clipboard.

use std::sync::Arc;

use bridge_traits::share::{Clipboard, SharePayload, ShareSheet};
use tracing::{debug, warn};

use crate::error::{PlaybackError, Result};
use crate::types::Track;

/// Public watch link for a media id.
pub fn share_url(video_host: &str, media_id: &str) -> String {
    format!("https://{}/watch?v={}", video_host, media_id)
}

/// How a share request was fulfilled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOutcome {
    Shared,
    CopiedToClipboard,
    /// There was no current track.
    NothingToShare,
}

impl ShareOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareOutcome::Shared => "share_sheet",
            ShareOutcome::CopiedToClipboard => "clipboard",
            ShareOutcome::NothingToShare => "none",
        }
    }
}

#[derive(Clone)]
pub struct ShareService {
    video_host: String,
    sheet: Option<Arc<dyn ShareSheet>>,
    clipboard: Option<Arc<dyn Clipboard>>,
}

impl ShareService {
    pub fn new(video_host: impl Into<String>) -> Self {
        Self {
            video_host: video_host.into(),
            sheet: None,
            clipboard: None,
        }
    }

    pub fn with_share_sheet(mut self, sheet: Arc<dyn ShareSheet>) -> Self {
        self.sheet = Some(sheet);
        self
    }

    pub fn with_clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn payload_for(&self, track: &Track) -> SharePayload {
        SharePayload {
            title: format!("Listen to {}", track.title),
            text: format!("Check out {} by {}", track.title, track.artist),
            url: share_url(&self.video_host, &track.external_media_id),
        }
    }

    pub async fn share(&self, track: &Track) -> Result<ShareOutcome> {
        let payload = self.payload_for(track);
        let mut last_error = None;

        if let Some(sheet) = self.sheet.as_ref().filter(|sheet| sheet.is_available()) {
            match sheet.share(&payload).await {
                Ok(()) => return Ok(ShareOutcome::Shared),
                Err(e) => {
                    debug!(error = %e, "Share sheet failed, trying clipboard");
                    last_error = Some(e.to_string());
                }
            }
        }

        if let Some(clipboard) = &self.clipboard {
            return match clipboard.write_text(&payload.url).await {
                Ok(()) => Ok(ShareOutcome::CopiedToClipboard),
                Err(e) => {
                    warn!(error = %e, "Clipboard fallback failed");
                    Err(PlaybackError::ShareFailed(e.to_string()))
                }
            };
        }

        match last_error {
            Some(message) => Err(PlaybackError::ShareFailed(message)),
            None => Err(PlaybackError::ShareUnavailable),
        }
    }
}

impl std::fmt::Debug for ShareService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareService")
            .field("video_host", &self.video_host)
            .field("sheet", &self.sheet.is_some())
            .field("clipboard", &self.clipboard.is_some())
            .finish()
    }
}
