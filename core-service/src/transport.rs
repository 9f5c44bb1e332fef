//! UI-side transport controls: seek gestures, progress and volume/mute.
//!
//! The seek mode lives here rather than in the store so that engine time
//! updates can be held back while the user drags the progress bar.

use std::sync::Arc;

use core_playback::PlayerStore;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// Volume restored by unmute when nothing else was remembered.
pub const DEFAULT_UNMUTE_VOLUME: i32 = 80;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", content = "value")]
pub enum SeekMode {
    Idle,
    /// Provisional position in seconds.
    UserSeeking(f64),
}

pub struct TransportController {
    store: Arc<PlayerStore>,
    seek: Mutex<SeekMode>,
    restore_volume: Mutex<i32>,
}

impl TransportController {
    pub fn new(store: Arc<PlayerStore>) -> Self {
        let volume = store.snapshot().volume;
        let restore = if volume > 0 {
            volume.min(100)
        } else {
            DEFAULT_UNMUTE_VOLUME
        };
        Self {
            store,
            seek: Mutex::new(SeekMode::Idle),
            restore_volume: Mutex::new(restore),
        }
    }

    pub fn seek_mode(&self) -> SeekMode {
        *self.seek.lock()
    }

    pub fn is_seeking(&self) -> bool {
        matches!(self.seek_mode(), SeekMode::UserSeeking(_))
    }

    // ========================================================================
    // Seek gestures
    // ========================================================================

    pub fn begin_seek(&self, seconds: f64) {
        *self.seek.lock() = SeekMode::UserSeeking(sanitize(seconds));
    }

    /// Ignored unless a gesture is in progress.
    pub fn update_seek(&self, seconds: f64) {
        let mut seek = self.seek.lock();
        if let SeekMode::UserSeeking(value) = &mut *seek {
            *value = sanitize(seconds);
        }
    }

    /// Commits the provisional position. Returns whether a gesture ended.
    pub fn end_seek(&self) -> bool {
        let previous = std::mem::replace(&mut *self.seek.lock(), SeekMode::Idle);
        match previous {
            SeekMode::UserSeeking(seconds) => {
                debug!(seconds, "Seek committed");
                self.store.set_current_time(seconds);
                true
            }
            SeekMode::Idle => false,
        }
    }

    pub fn cancel_seek(&self) {
        *self.seek.lock() = SeekMode::Idle;
    }

    /// Jumps to `fraction` of the known duration. No-op while the duration
    /// is unknown.
    pub fn seek_to_fraction(&self, fraction: f64) {
        let duration = self.store.snapshot().duration;
        if !fraction.is_finite() || duration <= 0.0 {
            return;
        }
        self.store
            .set_current_time(fraction.clamp(0.0, 1.0) * duration);
    }

    // ========================================================================
    // Progress
    // ========================================================================

    pub fn displayed_time(&self) -> f64 {
        match self.seek_mode() {
            SeekMode::UserSeeking(seconds) => seconds,
            SeekMode::Idle => self.store.snapshot().current_time,
        }
    }

    pub fn progress_percent(&self) -> f64 {
        let duration = self.store.snapshot().duration;
        if duration <= 0.0 {
            return 0.0;
        }
        (self.displayed_time() / duration * 100.0).clamp(0.0, 100.0)
    }

    /// Engine time report. Dropped while the user is seeking.
    pub fn on_time_update(&self, seconds: f64) {
        if self.is_seeking() {
            return;
        }
        self.store.set_current_time(seconds);
    }

    pub fn on_duration_change(&self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.store.set_duration(seconds);
        }
    }

    /// Time report tagged with the media it was read from. Reports for
    /// anything but the current track are stale and dropped.
    pub fn on_engine_time(&self, media_id: &str, seconds: f64) {
        if self.is_current_media(media_id) {
            self.on_time_update(seconds);
        } else {
            debug!(media_id, seconds, "Dropping stale time update");
        }
    }

    pub fn on_engine_duration(&self, media_id: &str, seconds: f64) {
        if self.is_current_media(media_id) {
            self.on_duration_change(seconds);
        }
    }

    fn is_current_media(&self, media_id: &str) -> bool {
        self.store
            .snapshot()
            .current_track
            .is_some_and(|track| track.external_media_id == media_id)
    }

    /// Engine duration when known, otherwise the track's display string.
    pub fn display_duration(&self) -> String {
        let snapshot = self.store.snapshot();
        if snapshot.duration > 0.0 {
            return format_time(snapshot.duration);
        }
        snapshot
            .current_track
            .map(|track| track.duration)
            .filter(|duration| !duration.is_empty())
            .unwrap_or_else(|| format_time(0.0))
    }

    // ========================================================================
    // Volume
    // ========================================================================

    pub fn set_volume(&self, volume: i32) {
        let volume = volume.clamp(0, 100);
        if volume > 0 {
            *self.restore_volume.lock() = volume;
        }
        self.store.set_volume(volume);
    }

    pub fn is_muted(&self) -> bool {
        self.store.snapshot().volume <= 0
    }

    pub fn toggle_mute(&self) {
        let current = self.store.snapshot().volume;
        if current > 0 {
            *self.restore_volume.lock() = current.min(100);
            self.store.set_volume(0);
        } else {
            let restore = *self.restore_volume.lock();
            let restore = if restore > 0 {
                restore
            } else {
                DEFAULT_UNMUTE_VOLUME
            };
            self.store.set_volume(restore);
        }
    }
}

fn sanitize(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

/// `M:SS`, minutes unbounded. Non-finite or negative input gives `0:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
