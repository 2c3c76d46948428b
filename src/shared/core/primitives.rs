use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Millisecond clock that never hands out the same value twice.
///
/// Wall-clock time is used while it moves forward; when two calls land in the
/// same millisecond (or the wall clock steps back) the previous value is bumped by one.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: AtomicI64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    /// Guarantee that every later `next_millis` is strictly greater than `floor`.
    pub fn advance_past(&self, floor: i64) {
        self.last.fetch_max(floor, Ordering::SeqCst);
    }
}
