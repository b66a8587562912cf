// ABOUTME: Incremental fetch window computed from the last known reading
// ABOUTME: Clamps lookback to 48 hours and sizes pagination by 5-minute sampling intervals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::fetch::{LOOKBACK_HOURS, SAMPLE_INTERVAL_MINUTES};

/// Checkpoint reported by the scheduler for the previous successful cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastKnown {
    /// Timestamp of the newest reading already forwarded downstream
    pub readings_at: Option<DateTime<Utc>>,
}

impl LastKnown {
    /// Checkpoint at a given reading timestamp
    #[must_use]
    pub const fn at(readings_at: DateTime<Utc>) -> Self {
        Self {
            readings_at: Some(readings_at),
        }
    }
}

/// Time range and page size for one fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    /// Floor of the window: the last known reading, clamped to the lookback
    pub since: DateTime<Utc>,
    /// Upper bound of the window (the cycle's "now")
    pub until: DateTime<Utc>,
    /// Start of the full lookback range, encoded in endpoint URLs
    pub range_start: DateTime<Utc>,
    /// Page size for paginated endpoints: ceil((until - since) / 5 min)
    pub max_count: u32,
}

impl FetchWindow {
    /// Compute the window for a cycle running at `now`
    ///
    /// A checkpoint older than the lookback is clamped to `now - 48h`; a checkpoint
    /// in the future is clamped to `now` so that `since <= until` always holds.
    #[must_use]
    pub fn compute(now: DateTime<Utc>, last_known: &LastKnown) -> Self {
        let range_start = now - Duration::hours(LOOKBACK_HOURS);
        let since = last_known
            .readings_at
            .map_or(range_start, |known| known.max(range_start))
            .min(now);

        Self {
            since,
            until: now,
            range_start,
            max_count: intervals_between(since, now),
        }
    }

    /// Elapsed time covered by the paginated endpoints
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.until - self.since
    }
}

/// Number of sampling intervals needed to cover `from..to`, rounded up
fn intervals_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let elapsed_ms = (to - from).num_milliseconds().max(0);
    let interval_ms = Duration::minutes(SAMPLE_INTERVAL_MINUTES).num_milliseconds();
    let count = (elapsed_ms + interval_ms - 1) / interval_ms;
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_old_checkpoint_is_clamped_to_lookback() {
        let last = LastKnown::at(now() - Duration::days(10));
        let window = FetchWindow::compute(now(), &last);
        assert_eq!(window.since, now() - Duration::hours(48));
        assert_eq!(window.max_count, 576);
    }

    #[test]
    fn test_recent_checkpoint_is_used_exactly() {
        let checkpoint = now() - Duration::minutes(17);
        let window = FetchWindow::compute(now(), &LastKnown::at(checkpoint));
        assert_eq!(window.since, checkpoint);
        assert_eq!(window.until, now());
        assert_eq!(window.range_start, now() - Duration::hours(48));
        // 17 minutes needs 4 five-minute intervals
        assert_eq!(window.max_count, 4);
    }

    #[test]
    fn test_missing_checkpoint_uses_lookback() {
        let window = FetchWindow::compute(now(), &LastKnown::default());
        assert_eq!(window.since, window.range_start);
    }

    #[test]
    fn test_future_checkpoint_keeps_since_before_until() {
        let window = FetchWindow::compute(now(), &LastKnown::at(now() + Duration::hours(1)));
        assert_eq!(window.since, now());
        assert_eq!(window.max_count, 0);
    }

    #[test]
    fn test_max_count_always_covers_elapsed_time() {
        for seconds in [1_i64, 59, 299, 300, 301, 3_599, 86_399, 172_800] {
            let window = FetchWindow::compute(now(), &LastKnown::at(now() - Duration::seconds(seconds)));
            let covered = Duration::minutes(SAMPLE_INTERVAL_MINUTES) * i32::try_from(window.max_count).unwrap();
            assert!(covered >= window.elapsed(), "window of {seconds}s not covered");
        }
    }
}
