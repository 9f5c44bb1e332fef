//! # Host Bridge Traits
//!
//! Capabilities the playback core needs from its host, one trait per concern.
//!
//! ### Playback
//! - [`EngineHost`](media::EngineHost) loads the embeddable player and builds instances
//! - [`MediaEngine`](media::MediaEngine) is one instance's imperative control surface
//!
//! ### Sharing
//! - [`ShareSheet`](share::ShareSheet) and [`Clipboard`](share::Clipboard)
//!
//! ### Data
//! - [`HttpClient`](http::HttpClient) for catalog requests
//! - [`RecordStore`](storage::RecordStore) for offline records
//!
//! ### Utilities
//! - [`Clock`](time::Clock) for deterministic timestamps
//! - [`LoggerSink`](time::LoggerSink) to forward logs to the host
//!
//! Hosts that cannot offer a capability either leave it out of the core
//! configuration (optional bridges) or return
//! [`BridgeError::NotAvailable`](error::BridgeError::NotAvailable) from the
//! individual method. Required bridges are checked when the configuration is
//! built, so a missing one fails before anything runs.

pub mod error;
pub mod http;
pub mod media;
pub mod share;
pub mod storage;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use media::{EngineHost, EngineOptions, EngineSignal, EngineState, MediaEngine, SignalSender};
pub use share::{Clipboard, SharePayload, ShareSheet};
pub use storage::RecordStore;
pub use time::{Clock, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
