//! Embeddable media engine surface.
//!
//! The engine is a third-party player the host mounts (an iframe player on
//! the web, a webview elsewhere). It loads asynchronously, reports its state
//! through callbacks and exposes an imperative control surface in which any
//! method may be missing or fail. The core never trusts it: every call goes
//! through a guard in the playback adapter.

use async_trait::async_trait;
use core_async::sync::mpsc;
use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Player state as reported by the engine's state-change callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl EngineState {
    /// Maps the engine's numeric state code. Unknown codes yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::Unstarted),
            0 => Some(Self::Ended),
            1 => Some(Self::Playing),
            2 => Some(Self::Paused),
            3 => Some(Self::Buffering),
            5 => Some(Self::Cued),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Unstarted => -1,
            Self::Ended => 0,
            Self::Playing => 1,
            Self::Paused => 2,
            Self::Buffering => 3,
            Self::Cued => 5,
        }
    }
}

/// Construction options passed when the host builds a player instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub media_id: String,
    pub autoplay: bool,
    pub controls_visible: bool,
    /// Already clamped to 0..=100.
    pub volume: u8,
}

/// Callbacks raised by a constructed engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineSignal {
    Ready,
    StateChange(i32),
    Error(i32),
}

pub type SignalSender = mpsc::UnboundedSender<EngineSignal>;

fn missing<T>(method: &str) -> Result<T> {
    Err(BridgeError::not_available(method))
}

/// Imperative control surface of one engine instance.
///
/// Every method defaults to `BridgeError::NotAvailable`, which is how a host
/// expresses "this method does not exist on the player object". Getters may
/// return NaN before the engine has settled. Instances live inside the
/// spawned adapter task, which borrows them across awaits, hence `Sync`.
pub trait MediaEngine: Send + Sync {
    fn play_video(&self) -> Result<()> {
        missing("playVideo")
    }

    fn pause_video(&self) -> Result<()> {
        missing("pauseVideo")
    }

    fn seek_to(&self, seconds: f64, allow_seek_ahead: bool) -> Result<()> {
        let _ = (seconds, allow_seek_ahead);
        missing("seekTo")
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        let _ = volume;
        missing("setVolume")
    }

    fn current_time(&self) -> Result<f64> {
        missing("getCurrentTime")
    }

    fn duration(&self) -> Result<f64> {
        missing("getDuration")
    }

    /// Raw state code, see [`EngineState::from_code`].
    fn player_state(&self) -> Result<i32> {
        missing("getPlayerState")
    }

    fn load_video_by_id(&self, media_id: &str) -> Result<()> {
        let _ = media_id;
        missing("loadVideoById")
    }

    fn cue_video_by_id(&self, media_id: &str) -> Result<()> {
        let _ = media_id;
        missing("cueVideoById")
    }

    /// Shows or hides the rendered surface without touching playback.
    fn set_surface_visible(&self, visible: bool) -> Result<()> {
        let _ = visible;
        missing("setSurfaceVisible")
    }

    fn destroy(&self) -> Result<()> {
        missing("destroy")
    }
}

/// Host side of the engine: bootstrap loading and instance construction.
#[async_trait]
pub trait EngineHost: Send + Sync {
    /// Requests the engine's bootstrap resource (the player API script).
    ///
    /// Resolves once the resource has been requested and its global
    /// registration has fired. Callers memoize this; hosts may assume it is
    /// invoked at most once per successful load.
    async fn load_engine(&self) -> Result<()>;

    /// Whether the engine global is already registered.
    fn is_engine_available(&self) -> bool;

    /// Builds a player instance in the mounted container.
    ///
    /// The instance reports its callbacks through `signals` for as long as
    /// it lives.
    fn create_engine(
        &self,
        options: EngineOptions,
        signals: SignalSender,
    ) -> Result<Box<dyn MediaEngine>>;
}
