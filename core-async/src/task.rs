//! Task spawning.

pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns a future onto the current runtime.
///
/// Must be called from within a runtime context.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

pub type Result<T> = std::result::Result<T, JoinError>;
