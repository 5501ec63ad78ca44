//! Time-bucket label calculation.
//!
//! Bucket labels feed the dedup key: two calls land in the same bucket
//! exactly when their labels match. Time is read through the [`Clock`]
//! trait so tests can pin the instant.

use chrono::{DateTime, Timelike, Utc};

use crate::models::TimeBucket;

/// Label used for the `forever` bucket, independent of the clock.
pub const FOREVER_BUCKET_LABEL: &str = "forever_bucket";

/// Source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall-clock time source used at runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a fixed instant, for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Computes the label for `bucket` at the clock's current instant.
///
/// Timed buckets render as `YYYY-MM-DD_HH:MM` with the minute floored to
/// the bucket width; the flooring is inclusive on the lower boundary, so
/// at 10:20:00.000 the 5-minute label is `..._10:20` while at 10:19:59.999
/// it is still `..._10:15`.
pub fn bucket_label(bucket: TimeBucket, clock: &dyn Clock) -> String {
    let window = match bucket.window_minutes() {
        Some(window) => window,
        None => return FOREVER_BUCKET_LABEL.to_string(),
    };

    let now = clock.now_utc();
    let floored = now.minute() - now.minute() % window;

    format!(
        "{}_{:02}:{:02}",
        now.format("%Y-%m-%d"),
        now.hour(),
        floored
    )
}
