//! # External Player Adapter
//!
//! Drives an untrusted [`MediaEngine`] toward the store's desired state.
//!
//! The adapter is a plain state machine: it owns at most one engine
//! instance, reacts to engine signals and reconciles on demand. Timing
//! (polling, bootstrap timeouts, teardown) lives in [`crate::driver`].
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized -> Loading -> Initialized -> Ready -> Destroyed
//!                     \            \
//!                      `-> Failed   `-> Failed
//! ```
//!
//! Every engine call is guarded. A missing method is logged at debug, any
//! other failure at warn, and neither ever escapes the adapter.

use std::time::Duration;

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::media::{
    EngineHost, EngineOptions, EngineSignal, EngineState, MediaEngine, SignalSender,
};
use core_async::sync::mpsc;
use core_runtime::config::PlaybackSettings;
use tracing::{debug, error, info, warn};

use crate::types::DesiredPlayback;

/// Tuning for one adapter instance.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSettings {
    pub poll_interval: Duration,
    pub seek_tolerance_secs: f64,
    /// `None` waits for the bootstrap indefinitely.
    pub load_timeout: Option<Duration>,
}

impl From<&PlaybackSettings> for AdapterSettings {
    fn from(settings: &PlaybackSettings) -> Self {
        Self {
            poll_interval: settings.poll_interval(),
            seek_tolerance_secs: settings.seek_tolerance_secs,
            load_timeout: settings.engine_load_timeout(),
        }
    }
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self::from(&PlaybackSettings::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterPhase {
    Uninitialized,
    /// Waiting for the engine bootstrap.
    Loading,
    /// Bootstrap done, instance constructed or about to be.
    Initialized,
    Ready,
    /// Bootstrap or construction failed. Terminal until the next mount.
    Failed,
    Destroyed,
}

/// Notifications raised toward the store.
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent {
    Ready,
    Play,
    Pause,
    End,
    /// Emitted on every poll while playing. Tagged with the media the
    /// engine had loaded when it was read, so a report that arrives after a
    /// track change can be told apart.
    TimeUpdate { media_id: String, seconds: f64 },
    /// Emitted when the engine first reports a usable duration.
    DurationChange { media_id: String, seconds: f64 },
    Failed(String),
}

/// Bookkeeping for the engine instance currently mounted.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterSession {
    pub generation: u64,
    /// The media the adapter wants loaded.
    pub target_media_id: String,
    /// The media confirmed loaded.
    pub loaded_media_id: Option<String>,
    pub ready: bool,
    pub last_known_state: EngineState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Engine not ready, nothing was done.
    Skipped,
    Applied,
    /// The engine cannot switch media in place; tear it down and rebuild.
    RebuildRequired,
}

enum LoadAttempt {
    Loaded,
    Unsupported,
    Failed,
}

/// Human readable label for an engine error code.
pub fn engine_error_label(code: i32) -> &'static str {
    match code {
        2 => "invalid parameter",
        5 => "html5 player error",
        100 => "video not found",
        101 | 150 => "embedding not allowed",
        _ => "unknown error",
    }
}

pub(crate) fn clamp_volume(volume: i32) -> u8 {
    volume.clamp(0, 100) as u8
}

pub struct PlayerAdapter {
    settings: AdapterSettings,
    phase: AdapterPhase,
    session: Option<AdapterSession>,
    engine: Option<Box<dyn MediaEngine>>,
    events: mpsc::UnboundedSender<AdapterEvent>,
    generation: u64,
    polling: bool,
    surface_visible: Option<bool>,
    reported_duration: Option<f64>,
    last_position: Option<f64>,
    /// Transport command sent but not yet confirmed by a state report.
    pending_transport: Option<bool>,
    /// End reported, waiting for the store to advance or pause.
    end_pending: bool,
}

impl PlayerAdapter {
    pub fn new(settings: AdapterSettings, events: mpsc::UnboundedSender<AdapterEvent>) -> Self {
        Self {
            settings,
            phase: AdapterPhase::Uninitialized,
            session: None,
            engine: None,
            events,
            generation: 0,
            polling: false,
            surface_visible: None,
            reported_duration: None,
            last_position: None,
            pending_transport: None,
            end_pending: false,
        }
    }

    pub fn phase(&self) -> AdapterPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&AdapterSession> {
        self.session.as_ref()
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    pub fn is_ready(&self) -> bool {
        self.phase == AdapterPhase::Ready && self.engine.is_some()
    }

    /// Whether time updates should be polled right now.
    pub fn is_polling(&self) -> bool {
        self.polling && self.is_ready()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Starts a session for the first playable media id.
    pub fn begin_loading(&mut self, media_id: &str) {
        if self.phase != AdapterPhase::Uninitialized {
            debug!(phase = ?self.phase, "begin_loading ignored");
            return;
        }
        self.session = Some(self.next_session(media_id));
        self.phase = AdapterPhase::Loading;
        debug!(media_id, "Waiting for media engine bootstrap");
    }

    pub fn engine_loaded(&mut self) {
        if self.phase == AdapterPhase::Loading {
            self.phase = AdapterPhase::Initialized;
        }
    }

    /// Moves a loading or initializing adapter into the terminal failed phase.
    pub fn fail(&mut self, reason: impl Into<String>) {
        if !matches!(self.phase, AdapterPhase::Loading | AdapterPhase::Initialized) {
            return;
        }
        let reason = reason.into();
        error!(reason = %reason, "Media engine failed");
        self.phase = AdapterPhase::Failed;
        self.polling = false;
        self.emit(AdapterEvent::Failed(reason));
    }

    /// Builds the engine instance. Constructs at most once per session.
    pub fn construct(
        &mut self,
        host: &dyn EngineHost,
        desired: &DesiredPlayback,
        signals: SignalSender,
    ) -> bool {
        if self.phase != AdapterPhase::Initialized || self.engine.is_some() {
            debug!(phase = ?self.phase, "Engine already constructed, skipping");
            return false;
        }
        let Some(session) = &self.session else {
            return false;
        };

        let options = EngineOptions {
            media_id: session.target_media_id.clone(),
            autoplay: desired.playing,
            controls_visible: !desired.audio_only,
            volume: clamp_volume(desired.volume),
        };
        match host.create_engine(options, signals) {
            Ok(engine) => {
                debug!(media_id = %session.target_media_id, "Media engine constructed");
                self.engine = Some(engine);
                self.surface_visible = Some(!desired.audio_only);
                true
            }
            Err(e) => {
                self.fail(format!("engine construction failed: {}", e));
                false
            }
        }
    }

    /// Tears the current instance down and constructs a fresh one for the
    /// desired media.
    pub fn rebuild(
        &mut self,
        host: &dyn EngineHost,
        desired: &DesiredPlayback,
        signals: SignalSender,
    ) -> bool {
        let Some(media_id) = desired.media_id.as_deref() else {
            return false;
        };
        info!(media_id, "Rebuilding media engine");
        self.release_engine();
        self.session = Some(self.next_session(media_id));
        self.phase = AdapterPhase::Initialized;
        self.construct(host, desired, signals)
    }

    /// Stops polling and destroys the instance. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.phase == AdapterPhase::Destroyed {
            return;
        }
        self.release_engine();
        self.session = None;
        self.phase = AdapterPhase::Destroyed;
        debug!("Player adapter destroyed");
    }

    fn release_engine(&mut self) {
        self.polling = false;
        if self.engine.is_some() {
            self.call("destroy", |e| e.destroy());
        }
        self.engine = None;
        self.surface_visible = None;
        self.reported_duration = None;
        self.last_position = None;
        self.pending_transport = None;
        self.end_pending = false;
    }

    fn next_session(&mut self, media_id: &str) -> AdapterSession {
        self.generation += 1;
        AdapterSession {
            generation: self.generation,
            target_media_id: media_id.to_string(),
            loaded_media_id: None,
            ready: false,
            last_known_state: EngineState::Unstarted,
        }
    }

    // ========================================================================
    // Engine signals
    // ========================================================================

    pub fn handle_signal(
        &mut self,
        signal: EngineSignal,
        desired: &DesiredPlayback,
    ) -> ReconcileOutcome {
        match signal {
            EngineSignal::Ready => self.on_ready(desired),
            EngineSignal::StateChange(code) => {
                self.on_state_change(code);
                ReconcileOutcome::Skipped
            }
            EngineSignal::Error(code) => {
                warn!(code, reason = engine_error_label(code), "Media engine error");
                ReconcileOutcome::Skipped
            }
        }
    }

    fn on_ready(&mut self, desired: &DesiredPlayback) -> ReconcileOutcome {
        if self.phase != AdapterPhase::Initialized || self.engine.is_none() {
            debug!(phase = ?self.phase, "Ignoring ready signal");
            return ReconcileOutcome::Skipped;
        }
        self.phase = AdapterPhase::Ready;
        if let Some(session) = self.session.as_mut() {
            session.ready = true;
            session.loaded_media_id = Some(session.target_media_id.clone());
            info!(media_id = %session.target_media_id, "Media engine ready");
        }

        let volume = clamp_volume(desired.volume);
        self.call("setVolume", |e| e.set_volume(volume));
        self.refresh_duration();
        if self.current_engine_state() == Some(EngineState::Playing) {
            self.polling = true;
        }
        self.emit(AdapterEvent::Ready);

        self.reconcile(desired)
    }

    fn on_state_change(&mut self, code: i32) {
        let Some(state) = EngineState::from_code(code) else {
            debug!(code, "Unknown engine state");
            return;
        };
        if let Some(session) = self.session.as_mut() {
            session.last_known_state = state;
        }
        if !self.is_ready() {
            return;
        }
        self.pending_transport = None;

        match state {
            EngineState::Playing => {
                self.polling = true;
                self.refresh_duration();
                self.emit(AdapterEvent::Play);
            }
            EngineState::Paused => {
                self.polling = false;
                self.emit(AdapterEvent::Pause);
            }
            EngineState::Ended => {
                self.polling = false;
                self.end_pending = true;
                self.emit(AdapterEvent::End);
            }
            EngineState::Unstarted | EngineState::Buffering | EngineState::Cued => {}
        }
    }

    /// Reads the position once. Called by the driver on every poll tick.
    pub fn poll(&mut self) {
        if !self.is_polling() {
            return;
        }
        let seconds = self.call("getCurrentTime", |e| e.current_time());
        if let (Some(seconds), Some(media_id)) = (seconds, self.loaded_media_id()) {
            if seconds.is_finite() && seconds >= 0.0 {
                let media_id = media_id.to_string();
                self.emit(AdapterEvent::TimeUpdate { media_id, seconds });
            }
        }
        if self.reported_duration.is_none() {
            self.refresh_duration();
        }
    }

    fn refresh_duration(&mut self) {
        let Some(seconds) = self.call("getDuration", |e| e.duration()) else {
            return;
        };
        if !seconds.is_finite() || seconds <= 0.0 {
            return;
        }
        let Some(media_id) = self.loaded_media_id().map(str::to_string) else {
            return;
        };
        if self.reported_duration != Some(seconds) {
            self.reported_duration = Some(seconds);
            self.emit(AdapterEvent::DurationChange { media_id, seconds });
        }
    }

    // ========================================================================
    // Reconciliation
    // ========================================================================

    /// Moves the engine toward `desired`.
    ///
    /// Applies, in order: volume, surface visibility, media identity, seek
    /// position and transport. Does nothing before the engine is ready.
    pub fn reconcile(&mut self, desired: &DesiredPlayback) -> ReconcileOutcome {
        if !self.is_ready() {
            return ReconcileOutcome::Skipped;
        }

        let volume = clamp_volume(desired.volume);
        self.call("setVolume", |e| e.set_volume(volume));

        let visible = !desired.audio_only;
        if self.surface_visible != Some(visible)
            && self
                .call("setSurfaceVisible", |e| e.set_surface_visible(visible))
                .is_some()
        {
            self.surface_visible = Some(visible);
        }

        let Some(target) = desired.media_id.as_deref() else {
            // Nothing to play: the old media must not keep running.
            self.apply_transport(false, false);
            return ReconcileOutcome::Applied;
        };

        let mut loaded_now = false;
        if self.loaded_media_id() != Some(target) {
            match self.load_in_place(target) {
                LoadAttempt::Loaded => loaded_now = true,
                LoadAttempt::Unsupported => return ReconcileOutcome::RebuildRequired,
                LoadAttempt::Failed => return ReconcileOutcome::Applied,
            }
        }

        if loaded_now {
            // Fresh media starts from the top.
            self.last_position = Some(desired.position);
        } else if self.last_position != Some(desired.position) {
            self.last_position = Some(desired.position);
            self.seek_if_drifted(desired.position);
        }

        self.apply_transport(desired.playing, loaded_now);
        ReconcileOutcome::Applied
    }

    fn loaded_media_id(&self) -> Option<&str> {
        self.session
            .as_ref()
            .and_then(|s| s.loaded_media_id.as_deref())
    }

    fn load_in_place(&mut self, media_id: &str) -> LoadAttempt {
        let Some(engine) = self.engine.as_deref() else {
            return LoadAttempt::Failed;
        };

        let result = match engine.load_video_by_id(media_id) {
            Err(e) if e.is_not_available() => {
                debug!("loadVideoById missing, falling back to cueVideoById");
                engine.cue_video_by_id(media_id)
            }
            other => other,
        };

        match result {
            Ok(()) => {
                debug!(media_id, "Loaded media in place");
                if let Some(session) = self.session.as_mut() {
                    session.target_media_id = media_id.to_string();
                    session.loaded_media_id = Some(media_id.to_string());
                    session.last_known_state = EngineState::Unstarted;
                }
                self.reported_duration = None;
                self.pending_transport = None;
                self.end_pending = false;
                LoadAttempt::Loaded
            }
            Err(e) if e.is_not_available() => LoadAttempt::Unsupported,
            Err(e) => {
                warn!(media_id, error = %e, "Failed to load media");
                LoadAttempt::Failed
            }
        }
    }

    fn seek_if_drifted(&mut self, position: f64) {
        let Some(now) = self.call("getCurrentTime", |e| e.current_time()) else {
            return;
        };
        if !now.is_finite() {
            return;
        }
        if (now - position).abs() > self.settings.seek_tolerance_secs {
            debug!(from = now, to = position, "Seeking engine");
            self.call("seekTo", |e| e.seek_to(position, true));
        }
    }

    fn apply_transport(&mut self, playing: bool, loaded_now: bool) {
        // A command the engine never confirmed must not block the opposite one.
        if self.pending_transport.is_some_and(|pending| pending != playing) {
            self.pending_transport = None;
        }

        if self.end_pending {
            if loaded_now || !playing {
                self.end_pending = false;
            } else {
                // The store has not reacted to the end yet.
                return;
            }
        }

        let engine_playing = matches!(
            self.current_engine_state(),
            Some(EngineState::Playing | EngineState::Buffering)
        );

        if playing && !engine_playing && self.pending_transport != Some(true) {
            if self.call("playVideo", |e| e.play_video()).is_some() {
                self.pending_transport = Some(true);
            }
        } else if !playing && engine_playing && self.pending_transport != Some(false) {
            if self.call("pauseVideo", |e| e.pause_video()).is_some() {
                self.pending_transport = Some(false);
            }
        }
    }

    fn current_engine_state(&self) -> Option<EngineState> {
        self.call("getPlayerState", |e| e.player_state())
            .and_then(EngineState::from_code)
            .or_else(|| self.session.as_ref().map(|s| s.last_known_state))
    }

    // ========================================================================
    // Guarded engine access
    // ========================================================================

    fn call<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&dyn MediaEngine) -> BridgeResult<T>,
    ) -> Option<T> {
        let engine = self.engine.as_deref()?;
        match f(engine) {
            Ok(value) => Some(value),
            Err(e) if e.is_not_available() => {
                debug!(op, "Engine method unavailable");
                None
            }
            Err(e) => {
                warn!(op, error = %e, "Engine call failed");
                None
            }
        }
    }

    fn emit(&self, event: AdapterEvent) {
        // The receiver goes away on unmount.
        let _ = self.events.send(event);
    }
}

impl Drop for PlayerAdapter {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for PlayerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerAdapter")
            .field("phase", &self.phase)
            .field("session", &self.session)
            .field("polling", &self.polling)
            .finish()
    }
}
