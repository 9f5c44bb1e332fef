//! Async runtime layer for the TuneStream playback core.
//!
//! Every core-* crate reaches tokio through this crate so the runtime surface
//! the core relies on stays small and in one place:
//! - `task`: spawning and join handles
//! - `time`: sleep, timeouts and the periodic ticker used by progress polling
//! - `sync`: channels, locks, once-cells and cancellation
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let token = CancellationToken::new();
//!     let child = token.child_token();
//!     let handle = core_async::spawn(async move { child.cancelled().await });
//!     sleep(Duration::from_millis(10)).await;
//!     token.cancel();
//!     let _ = handle.await;
//! }
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use tokio::select;
pub use time::{sleep, Duration, Instant};
