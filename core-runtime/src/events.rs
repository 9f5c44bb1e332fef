//! # Event Bus
//!
//! Broadcast channel for observing what the playback core does, built on
//! `tokio::sync::broadcast`. Events are notifications only: the store owns
//! playback state and nothing here feeds back into it.
//!
//! ```text
//! PlayerStore ──┐
//! event pump  ──┼── emit ──> EventBus ── subscribe ──> UI, analytics, logs
//! services    ──┘
//! ```
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(32);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::QueueChanged { length: 3 })).ok();
//! assert_eq!(
//!     rx.recv().await.unwrap(),
//!     CoreEvent::Playback(PlaybackEvent::QueueChanged { length: 3 })
//! );
//! # }
//! ```
//!
//! `emit` fails when nobody is subscribed; publishers ignore that. Slow
//! subscribers get `RecvError::Lagged(n)` and may keep reading.

use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Playback(PlaybackEvent),
    Engine(EngineEvent),
    Library(LibraryEvent),
    Catalog(CatalogEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Engine(e) => e.description(),
            CoreEvent::Library(e) => e.description(),
            CoreEvent::Catalog(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Engine(EngineEvent::Failed { .. }) => EventSeverity::Error,
            CoreEvent::Catalog(CatalogEvent::SearchFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Engine(EngineEvent::Ready { .. }) => EventSeverity::Info,
            CoreEvent::Playback(PlaybackEvent::TrackStarted { .. }) => EventSeverity::Info,
            CoreEvent::Library(_) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Transitions of the player store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A different track became current and is meant to play.
    TrackStarted { track_id: String, title: String },
    Paused { track_id: String, position_ms: u64 },
    Resumed { track_id: String, position_ms: u64 },
    QueueChanged { length: usize },
    /// End of media was reported for this track.
    TrackCompleted { track_id: String },
    AudioModeChanged { audio_only: bool },
    VolumeChanged { volume: i32 },
    /// `method` is `"share_sheet"` or `"clipboard"`.
    Shared { track_id: String, method: String },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::TrackStarted { .. } => "Track started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Resumed { .. } => "Playback resumed",
            PlaybackEvent::QueueChanged { .. } => "Queue changed",
            PlaybackEvent::TrackCompleted { .. } => "Track completed",
            PlaybackEvent::AudioModeChanged { .. } => "Audio-only mode changed",
            PlaybackEvent::VolumeChanged { .. } => "Volume changed",
            PlaybackEvent::Shared { .. } => "Track shared",
        }
    }
}

// ============================================================================
// Engine Events
// ============================================================================

/// Lifecycle of the embedded media engine behind the adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum EngineEvent {
    Ready { media_id: String },
    /// The adapter gave up initialising; it will not recover on its own.
    Failed { message: String },
}

impl EngineEvent {
    fn description(&self) -> &str {
        match self {
            EngineEvent::Ready { .. } => "Media engine ready",
            EngineEvent::Failed { .. } => "Media engine failed to initialise",
        }
    }
}

// ============================================================================
// Library Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    OfflineSaved { media_id: String, title: String },
    OfflineRemoved { media_id: String },
}

impl LibraryEvent {
    fn description(&self) -> &str {
        match self {
            LibraryEvent::OfflineSaved { .. } => "Saved for offline",
            LibraryEvent::OfflineRemoved { .. } => "Removed from offline library",
        }
    }
}

// ============================================================================
// Catalog Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CatalogEvent {
    SearchCompleted { query: String, results: usize },
    SearchFailed { query: String, message: String },
}

impl CatalogEvent {
    fn description(&self) -> &str {
        match self {
            CatalogEvent::SearchCompleted { .. } => "Catalog search completed",
            CatalogEvent::SearchFailed { .. } => "Catalog search failed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Cloneable handle to the broadcast channel. Clones share the channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// `capacity` is the per-subscriber backlog before `Lagged` is reported.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers that received the event, or an
    /// error when there are none.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// New receiver for future events. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver wrapper that skips events not matching a predicate.
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let bus = EventBus::default();
/// let engine_only = EventStream::new(bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Engine(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next matching event.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` when `n` events were dropped for this
    /// subscriber, `RecvError::Closed` once every sender is gone.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing
    /// matching is queued.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}
