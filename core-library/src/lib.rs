//! # Offline Library Module
//!
//! Keeps the list of tracks the user marked for offline listening.
//!
//! ## Overview
//!
//! This module manages:
//! - Offline record models and their JSON storage form
//! - Save, remove, lookup, listing and toggling over a host `RecordStore`

pub mod error;
pub mod models;
pub mod offline;

pub use error::{LibraryError, Result};
pub use models::{OfflineEntry, OfflineRecord};
pub use offline::OfflineLibrary;
