//! Divergence decision between the local send log and the provider's
//!
//! Given the hourly view of both sources, decide whether sending has silently
//! stalled. The provider undercounting relative to the local log is the only
//! outage signal; everything else is either healthy or legitimately idle.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::HourBucket;

/// Verdict of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileResult {
    pub success: bool,
    /// Local log count at the hour that drove the verdict
    pub local_count: u64,
    /// Provider count at the same hour
    pub provider_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sent_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_since_last_sent: Option<i64>,
}

impl ReconcileResult {
    fn passed(local_count: u64, provider_count: u64) -> Self {
        Self {
            success: true,
            local_count,
            provider_count,
            last_sent_at: None,
            minutes_since_last_sent: None,
        }
    }
}

/// Which attempt of the bounded back-off is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    First,
    Second,
}

fn count_at(buckets: &[HourBucket], hour: u32) -> u64 {
    buckets
        .iter()
        .find(|b| b.hour == hour)
        .map(|b| b.count)
        .unwrap_or(0)
}

fn previous_hour(hour: u32) -> u32 {
    if hour == 0 {
        23
    } else {
        hour - 1
    }
}

/// Compare the two hourly views and classify any divergence.
///
/// Both bucket sequences must be most-recent-first, as produced by
/// [`crate::aggregate::aggregate_by_hour`]. The candidate hour is taken from
/// the provider when it reported anything at all, since the provider is the
/// side being validated; otherwise from the local log. An hour that is silent
/// in both sources earns exactly one retry at the hour before it (wrapping
/// midnight), after which two consecutive silent hours count as idle, not as
/// an outage.
///
/// When the provider undercounts, the last local send inside `timeout_minutes`
/// of `now` means the send may simply not have propagated yet.
pub fn reconcile(
    local: &[HourBucket],
    provider: &[HourBucket],
    last_sent_at: Option<DateTime<Utc>>,
    timeout_minutes: i64,
    now: DateTime<Utc>,
) -> ReconcileResult {
    if local.is_empty() && provider.is_empty() {
        // Nothing recorded anywhere today. Not a failure signal at this layer.
        return ReconcileResult::passed(0, 0);
    }

    let mut hour = match provider.first() {
        Some(bucket) => bucket.hour,
        None => local[0].hour,
    };
    let mut pass = Pass::First;

    loop {
        let local_count = count_at(local, hour);
        let provider_count = count_at(provider, hour);

        if provider_count == 0 && local_count == 0 {
            match pass {
                Pass::First => {
                    hour = previous_hour(hour);
                    pass = Pass::Second;
                    continue;
                }
                // Two consecutive silent hours: legitimately idle
                Pass::Second => return ReconcileResult::passed(0, 0),
            }
        }

        if provider_count == local_count {
            return ReconcileResult::passed(local_count, provider_count);
        }

        if provider_count < local_count {
            let minutes = last_sent_at.map(|sent| (now - sent).num_minutes().abs());
            return ReconcileResult {
                success: minutes.map_or(true, |m| m <= timeout_minutes),
                local_count,
                provider_count,
                last_sent_at,
                minutes_since_last_sent: minutes,
            };
        }

        // Provider ahead of the local log. Local undercounting is not an
        // outage signal from this side.
        return ReconcileResult::passed(local_count, provider_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bucket(hour: u32, count: u64) -> HourBucket {
        HourBucket { hour, count }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 14, 14, 45, 0).unwrap()
    }

    fn minutes_ago(m: i64) -> DateTime<Utc> {
        now() - chrono::Duration::minutes(m)
    }

    #[test]
    fn test_both_sources_empty_is_success() {
        let result = reconcile(&[], &[], None, 10, now());
        assert!(result.success);
        assert_eq!(result.local_count, 0);
        assert_eq!(result.provider_count, 0);
    }

    #[test]
    fn test_matching_counts() {
        let local = vec![bucket(14, 3)];
        let provider = vec![bucket(14, 3)];
        let result = reconcile(&local, &provider, Some(minutes_ago(5)), 10, now());

        assert!(result.success);
        assert_eq!(result.local_count, 3);
        assert_eq!(result.provider_count, 3);
    }

    #[test]
    fn test_matching_counts_across_all_hours() {
        let local = vec![bucket(14, 3), bucket(13, 8), bucket(9, 1)];
        let provider = vec![bucket(14, 3), bucket(13, 8), bucket(9, 1)];
        let result = reconcile(&local, &provider, Some(minutes_ago(1)), 10, now());

        assert!(result.success);
    }

    #[test]
    fn test_undercount_inside_grace_window() {
        let local = vec![bucket(14, 5)];
        let provider = vec![bucket(14, 2)];
        let result = reconcile(&local, &provider, Some(minutes_ago(3)), 10, now());

        assert!(result.success);
        assert_eq!(result.local_count, 5);
        assert_eq!(result.provider_count, 2);
        assert_eq!(result.minutes_since_last_sent, Some(3));
    }

    #[test]
    fn test_undercount_past_grace_window_fails() {
        let local = vec![bucket(14, 5)];
        let provider = vec![bucket(14, 2)];
        let result = reconcile(&local, &provider, Some(minutes_ago(20)), 10, now());

        assert!(!result.success);
        assert_eq!(result.local_count, 5);
        assert_eq!(result.provider_count, 2);
        assert_eq!(result.minutes_since_last_sent, Some(20));
        assert_eq!(result.last_sent_at, Some(minutes_ago(20)));
    }

    #[test]
    fn test_undercount_without_last_sent_passes() {
        // No last-send timestamp to measure against: treated as just sent
        let local = vec![bucket(14, 5)];
        let provider = vec![bucket(14, 2)];
        let result = reconcile(&local, &provider, None, 10, now());

        assert!(result.success);
        assert_eq!(result.minutes_since_last_sent, None);
    }

    #[test]
    fn test_provider_overcount_is_success() {
        let local = vec![bucket(14, 1)];
        let provider = vec![bucket(14, 40)];
        let result = reconcile(&local, &provider, Some(minutes_ago(90)), 10, now());

        assert!(result.success);
        assert_eq!(result.local_count, 1);
        assert_eq!(result.provider_count, 40);
    }

    #[test]
    fn test_candidate_hour_prefers_provider() {
        // Provider's latest hour is 14, local's is 13. Hour 14 drives the
        // verdict: provider 4 vs local 0 is an overcount, success.
        let local = vec![bucket(13, 6)];
        let provider = vec![bucket(14, 4), bucket(13, 6)];
        let result = reconcile(&local, &provider, Some(minutes_ago(60)), 10, now());

        assert!(result.success);
        assert_eq!(result.local_count, 0);
        assert_eq!(result.provider_count, 4);
    }

    #[test]
    fn test_local_hour_drives_when_provider_empty() {
        let local = vec![bucket(14, 2)];
        let result = reconcile(&local, &[], Some(minutes_ago(30)), 10, now());

        assert!(!result.success);
        assert_eq!(result.local_count, 2);
        assert_eq!(result.provider_count, 0);
    }

    #[test]
    fn test_two_consecutive_silent_hours_is_idle() {
        // The provider reports hour 15 and 14 as explicitly idle
        let provider = vec![bucket(15, 0), bucket(14, 0)];
        let result = reconcile(&[], &provider, None, 10, now());

        assert!(result.success);
        assert_eq!(result.local_count, 0);
        assert_eq!(result.provider_count, 0);
    }

    #[test]
    fn test_silent_hours_at_midnight_wrap() {
        let provider = vec![bucket(0, 0), bucket(23, 0)];
        let result = reconcile(&[], &provider, None, 10, now());

        assert!(result.success);
    }

    #[test]
    fn test_second_pass_uses_previous_hour_counts() {
        // Hour 15 is silent in both sources, so the verdict comes from hour
        // 14, where the provider undercounts past the grace window.
        let local = vec![bucket(14, 4)];
        let provider = vec![bucket(15, 0), bucket(14, 2)];
        let result = reconcile(&local, &provider, Some(minutes_ago(30)), 10, now());

        assert!(!result.success);
        assert_eq!(result.local_count, 4);
        assert_eq!(result.provider_count, 2);
    }

    #[test]
    fn test_second_pass_success_from_previous_hour() {
        let local = vec![bucket(14, 2)];
        let provider = vec![bucket(15, 0), bucket(14, 2)];
        let result = reconcile(&local, &provider, Some(minutes_ago(30)), 10, now());

        assert!(result.success);
        assert_eq!(result.local_count, 2);
        assert_eq!(result.provider_count, 2);
    }

    #[test]
    fn test_second_pass_wraps_to_hour_23() {
        let local = vec![bucket(23, 5)];
        let provider = vec![bucket(0, 0), bucket(23, 5)];
        let result = reconcile(&local, &provider, Some(minutes_ago(120)), 10, now());

        assert!(result.success);
        assert_eq!(result.local_count, 5);
    }

    #[test]
    fn test_exactly_at_timeout_boundary_passes() {
        let local = vec![bucket(14, 5)];
        let provider = vec![bucket(14, 2)];
        let result = reconcile(&local, &provider, Some(minutes_ago(10)), 10, now());

        assert!(result.success);
    }
}
