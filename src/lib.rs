//! Workspace umbrella crate.
//!
//! Host applications can depend on `tunestream-workspace` and enable the
//! documented features instead of wiring each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::{PlayerService, Result, ServiceError, TransportController};

#[cfg(feature = "desktop-shims")]
pub use core_playback::{PlaybackSnapshot, Track};
