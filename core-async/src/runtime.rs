//! Runtime handles.

pub use tokio::runtime::{Builder, Handle, Runtime};
