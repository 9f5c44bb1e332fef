//! Scriptable engine and host used by the adapter and driver tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::media::{
    EngineHost, EngineOptions, EngineSignal, EngineState, MediaEngine, SignalSender,
};
use core_playback::{DesiredPlayback, Track};

// ============================================================================
// Fake engine
// ============================================================================

#[derive(Debug, Default)]
pub struct EngineLog {
    pub calls: Vec<String>,
    pub state: i32,
    pub time: f64,
    pub duration: f64,
    pub volume: Option<u8>,
    pub loaded: Option<String>,
    pub visible: Option<bool>,
    pub destroyed: bool,
}

/// Engine double that records every call and can drop methods on demand.
#[derive(Clone)]
pub struct FakeEngine {
    pub log: Arc<Mutex<EngineLog>>,
    signals: Option<SignalSender>,
    supports_load: bool,
    supports_cue: bool,
    echo_state: bool,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(EngineLog {
                state: EngineState::Unstarted.code(),
                duration: 212.0,
                ..EngineLog::default()
            })),
            signals: None,
            supports_load: true,
            supports_cue: true,
            echo_state: false,
        }
    }

    /// Reports play/pause through the signal channel like a real player.
    pub fn echoing(mut self, signals: SignalSender) -> Self {
        self.signals = Some(signals);
        self.echo_state = true;
        self
    }

    pub fn without_in_place_load(mut self) -> Self {
        self.supports_load = false;
        self.supports_cue = false;
        self
    }

    pub fn cue_only(mut self) -> Self {
        self.supports_load = false;
        self
    }

    pub fn count(&self, name: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|call| call.as_str() == name)
            .count()
    }

    pub fn set_time(&self, seconds: f64) {
        self.log.lock().unwrap().time = seconds;
    }

    pub fn set_state(&self, state: EngineState) {
        self.log.lock().unwrap().state = state.code();
    }

    fn record(&self, name: &str) {
        self.log.lock().unwrap().calls.push(name.to_string());
    }

    fn transition(&self, state: EngineState) {
        self.set_state(state);
        if self.echo_state {
            if let Some(signals) = &self.signals {
                let _ = signals.send(EngineSignal::StateChange(state.code()));
            }
        }
    }
}

impl MediaEngine for FakeEngine {
    fn play_video(&self) -> Result<()> {
        self.record("playVideo");
        self.transition(EngineState::Playing);
        Ok(())
    }

    fn pause_video(&self) -> Result<()> {
        self.record("pauseVideo");
        self.transition(EngineState::Paused);
        Ok(())
    }

    fn seek_to(&self, seconds: f64, _allow_seek_ahead: bool) -> Result<()> {
        self.record("seekTo");
        self.set_time(seconds);
        Ok(())
    }

    fn set_volume(&self, volume: u8) -> Result<()> {
        self.record("setVolume");
        self.log.lock().unwrap().volume = Some(volume);
        Ok(())
    }

    fn current_time(&self) -> Result<f64> {
        Ok(self.log.lock().unwrap().time)
    }

    fn duration(&self) -> Result<f64> {
        Ok(self.log.lock().unwrap().duration)
    }

    fn player_state(&self) -> Result<i32> {
        Ok(self.log.lock().unwrap().state)
    }

    fn load_video_by_id(&self, media_id: &str) -> Result<()> {
        if !self.supports_load {
            return Err(BridgeError::not_available("loadVideoById"));
        }
        self.record("loadVideoById");
        let mut log = self.log.lock().unwrap();
        log.loaded = Some(media_id.to_string());
        log.time = 0.0;
        log.state = EngineState::Unstarted.code();
        Ok(())
    }

    fn cue_video_by_id(&self, media_id: &str) -> Result<()> {
        if !self.supports_cue {
            return Err(BridgeError::not_available("cueVideoById"));
        }
        self.record("cueVideoById");
        let mut log = self.log.lock().unwrap();
        log.loaded = Some(media_id.to_string());
        log.time = 0.0;
        log.state = EngineState::Cued.code();
        Ok(())
    }

    fn set_surface_visible(&self, visible: bool) -> Result<()> {
        self.record("setSurfaceVisible");
        self.log.lock().unwrap().visible = Some(visible);
        Ok(())
    }

    fn destroy(&self) -> Result<()> {
        self.record("destroy");
        self.log.lock().unwrap().destroyed = true;
        Ok(())
    }
}

// ============================================================================
// Fake host
// ============================================================================

pub struct FakeHost {
    pub load_calls: AtomicUsize,
    pub available: AtomicBool,
    pub load_delay: Duration,
    pub fail_loads: AtomicUsize,
    pub in_place_load: bool,
    pub created: Mutex<Vec<(EngineOptions, FakeEngine)>>,
    pub signals: Mutex<Option<SignalSender>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            load_calls: AtomicUsize::new(0),
            available: AtomicBool::new(false),
            load_delay: Duration::ZERO,
            fail_loads: AtomicUsize::new(0),
            in_place_load: true,
            created: Mutex::new(Vec::new()),
            signals: Mutex::new(None),
        }
    }

    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    /// The next `count` bootstrap attempts fail.
    pub fn failing(self, count: usize) -> Self {
        self.fail_loads.store(count, Ordering::SeqCst);
        self
    }

    pub fn without_in_place_load(mut self) -> Self {
        self.in_place_load = false;
        self
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn engines(&self) -> Vec<FakeEngine> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(_, engine)| engine.clone())
            .collect()
    }

    pub fn last_engine(&self) -> Option<FakeEngine> {
        self.engines().pop()
    }

    pub fn last_options(&self) -> Option<EngineOptions> {
        self.created
            .lock()
            .unwrap()
            .last()
            .map(|(options, _)| options.clone())
    }

    /// Fires a callback on the most recently constructed instance.
    pub fn signal(&self, signal: EngineSignal) {
        if let Some(sender) = self.signals.lock().unwrap().as_ref() {
            let _ = sender.send(signal);
        }
    }
}

#[async_trait]
impl EngineHost for FakeHost {
    async fn load_engine(&self) -> Result<()> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        let remaining = self.fail_loads.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_loads.store(remaining - 1, Ordering::SeqCst);
            return Err(BridgeError::OperationFailed("script blocked".into()));
        }
        self.available.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_engine_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn create_engine(
        &self,
        options: EngineOptions,
        signals: SignalSender,
    ) -> Result<Box<dyn MediaEngine>> {
        let mut engine = FakeEngine::new().echoing(signals.clone());
        if !self.in_place_load {
            engine = engine.without_in_place_load();
        }
        if options.autoplay {
            engine.set_state(EngineState::Playing);
        }
        *self.signals.lock().unwrap() = Some(signals);
        self.created
            .lock()
            .unwrap()
            .push((options, engine.clone()));
        Ok(Box::new(engine))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn track(id: &str) -> Track {
    Track::new(id, format!("vid-{}", id), format!("Song {}", id), "Artist")
}

pub fn desired(media_id: &str, playing: bool) -> DesiredPlayback {
    DesiredPlayback {
        media_id: Some(media_id.to_string()),
        playing,
        volume: 80,
        audio_only: false,
        position: 0.0,
    }
}
