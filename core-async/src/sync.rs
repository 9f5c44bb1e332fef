//! Synchronization primitives.
//!
//! The playback core mutates state from a single logical task, so most of
//! what lives here is channels: `watch` carries the latest playback snapshot,
//! `mpsc` carries engine callbacks and adapter events, `broadcast` fans core
//! events out to observers.

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, OnceCell, RwLock,
};

pub use tokio_util::sync::CancellationToken;
