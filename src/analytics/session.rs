//! Session window and scan velocity analysis
//!
//! Both functions expect timestamps in ascending order and do not sort.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

pub const DEFAULT_SESSION_WINDOW_MINUTES: u32 = 15;

/// Number of most recent scans considered by [`calculate_velocity`]
const VELOCITY_SAMPLE: usize = 10;

/// A burst of scans separated by gaps no longer than the window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub scan_count: usize,

    /// Scans per minute of the window length
    pub intensity: f64,
}

fn minutes_between(earlier: &DateTime<FixedOffset>, later: &DateTime<FixedOffset>) -> f64 {
    (*later - *earlier).num_milliseconds() as f64 / 60_000.0
}

/// Group timestamps into windows; a gap of at most `window_minutes`
/// joins the current window.
pub fn detect_session_windows(
    timestamps: &[DateTime<FixedOffset>],
    window_minutes: u32,
) -> Vec<SessionWindow> {
    let Some((&first, rest)) = timestamps.split_first() else {
        return Vec::new();
    };

    let window_len = f64::from(window_minutes);
    let close = |start, end, scan_count: usize| SessionWindow {
        start,
        end,
        scan_count,
        intensity: scan_count as f64 / window_len,
    };

    let mut windows = Vec::new();
    let mut start = first;
    let mut prev = first;
    let mut count = 1usize;

    for &ts in rest {
        if minutes_between(&prev, &ts) <= window_len {
            count += 1;
        } else {
            windows.push(close(start, prev, count));
            start = ts;
            count = 1;
        }
        prev = ts;
    }
    windows.push(close(start, prev, count));

    windows
}

/// Scans per minute across the most recent ten timestamps
pub fn calculate_velocity(timestamps: &[DateTime<FixedOffset>]) -> f64 {
    if timestamps.len() < 2 {
        return 0.0;
    }

    let recent = &timestamps[timestamps.len().saturating_sub(VELOCITY_SAMPLE)..];
    let elapsed = minutes_between(&recent[0], &recent[recent.len() - 1]);

    if elapsed > 0.0 {
        recent.len() as f64 / elapsed
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at_minutes(minutes: &[i64]) -> Vec<DateTime<FixedOffset>> {
        let base = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .unwrap();
        minutes.iter().map(|m| base + Duration::minutes(*m)).collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_session_windows(&[], 15).is_empty());
    }

    #[test]
    fn test_single_timestamp() {
        let ts = at_minutes(&[0]);
        let windows = detect_session_windows(&ts, 15);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].scan_count, 1);
        assert_eq!(windows[0].start, windows[0].end);
    }

    #[test]
    fn test_gap_at_threshold_joins_window() {
        let ts = at_minutes(&[0, 15, 30]);
        let windows = detect_session_windows(&ts, 15);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].scan_count, 3);
        assert_eq!(windows[0].end, ts[2]);
    }

    #[test]
    fn test_gap_over_threshold_splits() {
        let ts = at_minutes(&[0, 5, 21, 22, 23, 60]);
        let windows = detect_session_windows(&ts, 15);
        let counts: Vec<usize> = windows.iter().map(|w| w.scan_count).collect();
        assert_eq!(counts, vec![2, 3, 1]);
        assert_eq!(windows[1].start, ts[2]);
        assert_eq!(windows[1].end, ts[4]);
        assert!((windows[1].intensity - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_velocity_needs_two_points() {
        assert_eq!(calculate_velocity(&[]), 0.0);
        assert_eq!(calculate_velocity(&at_minutes(&[3])), 0.0);
    }

    #[test]
    fn test_velocity_zero_elapsed() {
        assert_eq!(calculate_velocity(&at_minutes(&[4, 4, 4])), 0.0);
    }

    #[test]
    fn test_velocity_uses_last_ten() {
        // 12 scans one minute apart; last ten span 9 minutes
        let minutes: Vec<i64> = (0..12).collect();
        let velocity = calculate_velocity(&at_minutes(&minutes));
        assert!((velocity - 10.0 / 9.0).abs() < 1e-9);
    }
}
