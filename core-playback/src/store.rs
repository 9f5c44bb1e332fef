//! # Player State Store
//!
//! Single source of truth for what should be playing. Commands mutate the
//! state synchronously and every change is published on a watch channel,
//! so the engine adapter and any UI observer always see the latest
//! snapshot without replaying intermediate ones.
//!
//! The store never talks to the engine. It only records intent; the
//! adapter reconciles the engine toward it.

use core_async::sync::watch;
use core_runtime::config::PlaybackSettings;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use tracing::{debug, info};

use crate::error::Result;
use crate::share::{ShareOutcome, ShareService};
use crate::types::{DesiredPlayback, PlaybackSnapshot, Track};

pub struct PlayerStore {
    state: watch::Sender<PlaybackSnapshot>,
    share: ShareService,
    events: Option<EventBus>,
}

impl PlayerStore {
    pub fn new(settings: &PlaybackSettings) -> Self {
        let initial = PlaybackSnapshot::new(settings.default_volume, settings.default_audio_only);
        Self {
            state: watch::Sender::new(initial),
            share: ShareService::new(settings.video_host.clone()),
            events: None,
        }
    }

    pub fn with_share_service(mut self, share: ShareService) -> Self {
        self.share = share;
        self
    }

    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Current state.
    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every state change.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.state.subscribe()
    }

    pub fn desired(&self) -> DesiredPlayback {
        self.state.borrow().desired()
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Makes `track` current and starts playing it.
    ///
    /// A track already in the queue (matched by id) is selected in place;
    /// otherwise it is appended.
    pub fn play_track(&self, track: Track) {
        let mut appended = None;
        let mut started = false;
        let mut resumed_at = None;

        self.state.send_modify(|s| {
            let index = match s.queue.iter().position(|queued| queued.id == track.id) {
                Some(index) => index,
                None => {
                    s.queue.push(track.clone());
                    appended = Some(s.queue.len());
                    s.queue.len() - 1
                }
            };

            let same_track = s
                .current_track
                .as_ref()
                .is_some_and(|current| current.id == track.id);
            if same_track {
                if !s.is_playing {
                    resumed_at = Some(position_ms(s.current_time));
                }
            } else {
                s.current_time = 0.0;
                s.duration = 0.0;
                started = true;
            }

            if let Some(audio_only) = track.audio_only {
                s.is_audio_only = audio_only;
            }
            s.current_index = Some(index);
            s.current_track = Some(track.clone());
            s.is_playing = true;
        });

        debug!(track_id = %track.id, "play_track");
        if let Some(length) = appended {
            self.emit(PlaybackEvent::QueueChanged { length });
        }
        if started {
            self.emit(PlaybackEvent::TrackStarted {
                track_id: track.id.clone(),
                title: track.title.clone(),
            });
        } else if let Some(position_ms) = resumed_at {
            self.emit(PlaybackEvent::Resumed {
                track_id: track.id,
                position_ms,
            });
        }
    }

    pub fn pause_track(&self) {
        let mut paused = None;
        self.state.send_if_modified(|s| match &s.current_track {
            Some(track) if s.is_playing => {
                paused = Some((track.id.clone(), position_ms(s.current_time)));
                s.is_playing = false;
                true
            }
            _ => false,
        });

        if let Some((track_id, position_ms)) = paused {
            self.emit(PlaybackEvent::Paused {
                track_id,
                position_ms,
            });
        }
    }

    /// Flips play/pause. Does nothing without a current track.
    pub fn toggle_play(&self) {
        let mut flipped = None;
        self.state.send_if_modified(|s| match &s.current_track {
            Some(track) => {
                s.is_playing = !s.is_playing;
                flipped = Some((track.id.clone(), position_ms(s.current_time), s.is_playing));
                true
            }
            None => false,
        });

        match flipped {
            Some((track_id, position_ms, true)) => self.emit(PlaybackEvent::Resumed {
                track_id,
                position_ms,
            }),
            Some((track_id, position_ms, false)) => self.emit(PlaybackEvent::Paused {
                track_id,
                position_ms,
            }),
            None => {}
        }
    }

    pub fn toggle_audio_only(&self) {
        let mut audio_only = false;
        self.state.send_modify(|s| {
            s.is_audio_only = !s.is_audio_only;
            audio_only = s.is_audio_only;
        });
        self.emit(PlaybackEvent::AudioModeChanged { audio_only });
    }

    // ========================================================================
    // Queue
    // ========================================================================

    /// Appends without deduplication.
    pub fn add_to_queue(&self, track: Track) {
        let mut length = 0;
        self.state.send_modify(|s| {
            s.queue.push(track);
            length = s.queue.len();
        });
        self.emit(PlaybackEvent::QueueChanged { length });
    }

    /// Empties the queue. The current track keeps playing.
    pub fn clear_queue(&self) {
        self.state.send_modify(|s| {
            s.queue.clear();
            s.current_index = None;
        });
        self.emit(PlaybackEvent::QueueChanged { length: 0 });
    }

    /// Advances to the next queued track. Returns `false` at the end of the
    /// queue, leaving the state untouched.
    pub fn next_track(&self) -> bool {
        self.jump(|index| match index {
            None => Some(0),
            Some(index) => Some(index + 1),
        })
    }

    /// Steps back one queued track. Returns `false` at the start.
    pub fn previous_track(&self) -> bool {
        self.jump(|index| match index {
            Some(index) if index > 0 => Some(index - 1),
            _ => None,
        })
    }

    /// Handles the engine's end-of-track notification.
    pub fn complete_track(&self) {
        let finished = self.state.borrow().current_track.as_ref().map(|t| t.id.clone());
        let Some(track_id) = finished else {
            return;
        };
        self.emit(PlaybackEvent::TrackCompleted { track_id });

        if !self.next_track() {
            debug!("Queue exhausted, pausing");
            self.pause_track();
        }
    }

    fn jump<F>(&self, target: F) -> bool
    where
        F: FnOnce(Option<usize>) -> Option<usize>,
    {
        let mut started = None;
        let moved = self.state.send_if_modified(|s| {
            let Some(index) = target(s.current_index) else {
                return false;
            };
            let Some(track) = s.queue.get(index).cloned() else {
                return false;
            };

            if s.current_track.as_ref().map(|current| &current.id) != Some(&track.id) {
                s.current_time = 0.0;
                s.duration = 0.0;
            }
            started = Some((track.id.clone(), track.title.clone()));
            s.current_index = Some(index);
            s.current_track = Some(track);
            s.is_playing = true;
            true
        });

        if let Some((track_id, title)) = started {
            self.emit(PlaybackEvent::TrackStarted { track_id, title });
        }
        moved
    }

    // ========================================================================
    // Engine feedback and plain setters
    // ========================================================================

    /// Stores the volume as given. The adapter clamps it for the engine.
    pub fn set_volume(&self, volume: i32) {
        let changed = self.state.send_if_modified(|s| {
            if s.volume == volume {
                return false;
            }
            s.volume = volume;
            true
        });
        if changed {
            self.emit(PlaybackEvent::VolumeChanged { volume });
        }
    }

    /// Records a playback position. Non-finite input is ignored and
    /// negative input becomes 0.
    pub fn set_current_time(&self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let seconds = seconds.max(0.0);
        self.state.send_if_modified(|s| {
            if s.current_time == seconds {
                return false;
            }
            s.current_time = seconds;
            true
        });
    }

    pub fn set_duration(&self, seconds: f64) {
        if !seconds.is_finite() || seconds < 0.0 {
            return;
        }
        self.state.send_if_modified(|s| {
            if s.duration == seconds {
                return false;
            }
            s.duration = seconds;
            true
        });
    }

    /// Replaces the current track without touching the queue or transport.
    pub fn set_current_track(&self, track: Option<Track>) {
        self.state.send_modify(|s| {
            let same = match (&s.current_track, &track) {
                (Some(current), Some(next)) => current.id == next.id,
                (None, None) => true,
                _ => false,
            };
            if !same {
                s.current_time = 0.0;
                s.duration = 0.0;
            }
            if track.is_none() {
                s.is_playing = false;
            }
            s.current_index = track
                .as_ref()
                .and_then(|next| s.queue.iter().position(|queued| queued.id == next.id));
            s.current_track = track;
        });
    }

    // ========================================================================
    // Share
    // ========================================================================

    /// Shares the current track's public link.
    pub async fn share_track(&self) -> Result<ShareOutcome> {
        let Some(track) = self.snapshot().current_track else {
            return Ok(ShareOutcome::NothingToShare);
        };

        let outcome = self.share.share(&track).await?;
        info!(track_id = %track.id, method = outcome.as_str(), "Shared track");
        self.emit(PlaybackEvent::Shared {
            track_id: track.id,
            method: outcome.as_str().to_string(),
        });
        Ok(outcome)
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.events {
            // No subscribers is fine.
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }
}

fn position_ms(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0) as u64
}

impl std::fmt::Debug for PlayerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerStore")
            .field("state", &*self.state.borrow())
            .field("share", &self.share)
            .finish()
    }
}
