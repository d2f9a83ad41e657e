//! Hourly aggregation of timestamped send activity
//!
//! Both the local delivery log and the provider's send series are reduced to
//! the same shape here so the reconciliation engine can compare them.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Send activity for one hour of the day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBucket {
    /// Hour of day, 0-23, UTC
    pub hour: u32,
    /// Sends recorded in that hour
    pub count: u64,
}

/// Group timestamped items into per-hour buckets, most recent hour first.
///
/// `key` maps an item to its timestamp and weight. Delivery records weigh 1
/// each; provider series entries weigh their reported sent count. Items the
/// key cannot resolve are skipped.
///
/// Output order follows the underlying timestamps, not the hour number:
/// hour-of-day wraps at midnight, and callers need the most recent calendar
/// hour at the front. Buckets with a zero count are kept, since the provider
/// reports idle hours explicitly.
pub fn aggregate_by_hour<T>(
    items: &[T],
    key: impl Fn(&T) -> Option<(DateTime<Utc>, u64)>,
) -> Vec<HourBucket> {
    let mut keyed: Vec<(DateTime<Utc>, u64)> = items.iter().filter_map(&key).collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut buckets: Vec<HourBucket> = Vec::new();
    for (ts, weight) in keyed {
        let hour = ts.hour();
        match buckets.iter_mut().find(|b| b.hour == hour) {
            Some(bucket) => bucket.count += weight,
            None => buckets.push(HourBucket {
                hour,
                count: weight,
            }),
        }
    }
    buckets
}
