//! # Playback Synchronization Module
//!
//! Keeps an embedded media engine in step with the player's intended state.
//!
//! ## Overview
//!
//! This module handles:
//! - The player state store (current track, queue, transport, volume, time)
//! - The engine adapter state machine and its reconciliation pass
//! - Engine bootstrap memoization and the polling driver task
//! - Sharing the current track through the share sheet or clipboard
//!
//! ## Data flow
//!
//! ```text
//! UI commands -> PlayerStore --watch--> driver -> PlayerAdapter -> MediaEngine
//!                     ^                                |
//!                     `------ AdapterEvent <-----------'
//! ```
//!
//! The store never calls the engine and the adapter never mutates the
//! store; the service layer routes [`AdapterEvent`]s back into store
//! commands.

pub mod adapter;
pub mod bootstrap;
pub mod driver;
pub mod error;
pub mod share;
pub mod store;
pub mod types;

pub use adapter::{
    engine_error_label, AdapterEvent, AdapterPhase, AdapterSession, AdapterSettings,
    PlayerAdapter, ReconcileOutcome,
};
pub use bootstrap::EngineBootstrap;
pub use driver::{mount, AdapterHandle};
pub use error::{PlaybackError, Result};
pub use share::{share_url, ShareOutcome, ShareService};
pub use store::PlayerStore;
pub use types::{DesiredPlayback, PlaybackSnapshot, Track, TransportState};
