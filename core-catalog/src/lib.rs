//! # Catalog Client
//!
//! Search and detail lookups against the video catalog, plus the display
//! formatting applied to its raw values.
//!
//! ## Overview
//!
//! - [`CatalogClient`]: music-biased search joined with batched details
//! - [`format_duration`] / [`format_view_count`]: display strings
//! - [`CatalogTrack`] converts into a playable [`core_playback::Track`]

pub mod client;
pub mod error;
pub mod format;
pub mod types;

pub use client::{CatalogClient, TrackCatalog};
pub use error::{CatalogError, Result};
pub use format::{format_duration, format_view_count};
pub use types::CatalogTrack;
