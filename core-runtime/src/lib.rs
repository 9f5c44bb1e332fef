//! Runtime plumbing shared by the playback core: configuration, event bus,
//! logging bootstrap and the runtime error type.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
