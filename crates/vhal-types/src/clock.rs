use std::time::Instant;

use once_cell::sync::Lazy;

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

/// Monotonic nanoseconds elapsed since the clock was first read.
///
/// Successive calls never go backwards. Values saturate at `i64::MAX`.
#[must_use]
pub fn elapsed_realtime_nanos() -> i64 {
    i64::try_from(EPOCH.elapsed().as_nanos()).unwrap_or(i64::MAX)
}
