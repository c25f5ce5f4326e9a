//! Sleeps that stay responsive to shutdown.

use std::time::Duration;

use rand::Rng;

use crate::SessionFlags;

/// Longest single sleep; shutdown is noticed within this bound.
pub const SLEEP_SLICE: Duration = Duration::from_millis(500);

/// Bounds (seconds) of the delay before a paced reply.
pub const HUMAN_DELAY_SECS: (f64, f64) = (1.0, 2.0);

/// Sleeps for `duration` in slices of at most [`SLEEP_SLICE`], returning
/// early once `running` is cleared. Returns at once if it already is.
pub async fn divided_sleep(flags: &SessionFlags, duration: Duration) {
    let mut remaining = duration;
    while flags.is_running() {
        if remaining > SLEEP_SLICE {
            tokio::time::sleep(SLEEP_SLICE).await;
            remaining -= SLEEP_SLICE;
        } else {
            tokio::time::sleep(remaining).await;
            break;
        }
    }
}

/// A uniformly random reply delay within [`HUMAN_DELAY_SECS`].
pub fn human_delay() -> Duration {
    let (low, high) = HUMAN_DELAY_SECS;
    Duration::from_secs_f64(rand::rng().random_range(low..=high))
}
