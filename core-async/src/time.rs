//! Timers.

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};
pub use tokio::time::{
    interval, interval_at, sleep, timeout, Instant, Interval, MissedTickBehavior, Sleep,
};

/// Error returned by [`timeout`] when the deadline elapses first.
pub type Elapsed = tokio::time::error::Elapsed;

/// Creates a ticker whose first tick fires one full `period` from now.
///
/// `tokio::time::interval` completes its first tick immediately, which is
/// wrong for progress polling: a freshly started poll must wait one period
/// before reading the position. Missed ticks are delayed rather than burst,
/// so a stalled task never emits a flurry of catch-up updates.
pub fn periodic(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
