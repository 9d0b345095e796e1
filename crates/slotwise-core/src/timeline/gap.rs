//! Free interval detection between busy periods.
//!
//! Turns the busy periods of a day into the free intervals that remain inside
//! the working-day window.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::interval::TimeInterval;

/// An existing calendar commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub interval: TimeInterval,
}

impl BusyInterval {
    pub fn new(interval: TimeInterval) -> Self {
        Self {
            summary: None,
            interval,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }
}

impl From<TimeInterval> for BusyInterval {
    fn from(interval: TimeInterval) -> Self {
        Self::new(interval)
    }
}

/// Computes free intervals inside a working-day window.
#[derive(Debug, Clone)]
pub struct AvailabilityCalculator {
    /// Shorter free gaps are discarded
    min_slot: Duration,
}

impl AvailabilityCalculator {
    /// Create a new calculator with the default 15 minute minimum
    pub fn new() -> Self {
        Self {
            min_slot: Duration::minutes(15),
        }
    }

    /// Set the minimum slot duration
    pub fn with_min_slot(mut self, min_slot: Duration) -> Self {
        self.min_slot = min_slot;
        self
    }

    /// Find the free intervals of `window` not covered by `busy`.
    ///
    /// `busy` may be unsorted, overlapping, or reach outside the window.
    /// Overlapping and touching busy periods merge through the cursor, which
    /// only ever moves forward.
    ///
    /// # Returns
    /// Disjoint free intervals sorted by start, each at least `min_slot` long.
    pub fn free_intervals(&self, window: &TimeInterval, busy: &[BusyInterval]) -> Vec<TimeInterval> {
        let mut sorted: Vec<&TimeInterval> = busy.iter().map(|b| &b.interval).collect();
        sorted.sort_by_key(|iv| iv.start());

        let mut free = Vec::new();
        let mut cursor = window.start();

        for iv in sorted {
            if iv.start() >= window.end() {
                break;
            }

            if cursor < iv.start() {
                self.push_if_long_enough(&mut free, cursor, iv.start());
            }

            if iv.end() > cursor {
                cursor = iv.end().min(window.end());
            }
        }

        if cursor < window.end() {
            self.push_if_long_enough(&mut free, cursor, window.end());
        }

        free
    }

    fn push_if_long_enough(
        &self,
        free: &mut Vec<TimeInterval>,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    ) {
        // start < end is checked by both callers
        if let Ok(gap) = TimeInterval::new(start, end) {
            if gap.duration() >= self.min_slot {
                free.push(gap);
            }
        }
    }
}

impl Default for AvailabilityCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to find free intervals with the default minimum
pub fn detect_free_intervals(window: &TimeInterval, busy: &[BusyInterval]) -> Vec<TimeInterval> {
    AvailabilityCalculator::new().free_intervals(window, busy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn iv(h1: u32, m1: u32, h2: u32, m2: u32) -> TimeInterval {
        TimeInterval::new(at(h1, m1), at(h2, m2)).unwrap()
    }

    fn busy(h1: u32, m1: u32, h2: u32, m2: u32) -> BusyInterval {
        BusyInterval::new(iv(h1, m1, h2, m2))
    }

    #[test]
    fn test_single_meeting_splits_the_day() {
        let window = iv(9, 0, 17, 0);
        let free = detect_free_intervals(&window, &[busy(10, 0, 10, 30)]);

        assert_eq!(free, vec![iv(9, 0, 10, 0), iv(10, 30, 17, 0)]);
        assert_eq!(free[0].duration(), Duration::hours(1));
        assert_eq!(free[1].duration(), Duration::minutes(390));
    }

    #[test]
    fn test_no_busy_intervals_yields_whole_window() {
        let window = iv(9, 0, 17, 0);
        assert_eq!(detect_free_intervals(&window, &[]), vec![window]);
    }

    #[test]
    fn test_window_below_minimum_yields_nothing() {
        let window = iv(9, 0, 9, 10);
        assert!(detect_free_intervals(&window, &[]).is_empty());
    }

    #[test]
    fn test_unsorted_and_overlapping_busy_merge() {
        let window = iv(9, 0, 17, 0);
        let events = vec![
            busy(13, 0, 14, 0),
            busy(10, 0, 11, 0),
            busy(10, 30, 12, 0),
            busy(12, 0, 12, 30), // touches the previous one
        ];
        let free = detect_free_intervals(&window, &events);
        assert_eq!(free, vec![iv(9, 0, 10, 0), iv(12, 30, 13, 0), iv(14, 0, 17, 0)]);
    }

    #[test]
    fn test_short_gaps_are_discarded() {
        let window = iv(9, 0, 12, 0);
        let events = vec![busy(9, 10, 10, 0), busy(10, 10, 11, 50)];
        // 09:00-09:10, 10:00-10:10, 11:50-12:00 are all under 15 minutes
        assert!(detect_free_intervals(&window, &events).is_empty());

        let free = AvailabilityCalculator::new()
            .with_min_slot(Duration::minutes(10))
            .free_intervals(&window, &events);
        assert_eq!(free.len(), 3);
    }

    #[test]
    fn test_busy_outside_window_is_clipped() {
        let window = iv(9, 0, 17, 0);
        let events = vec![busy(7, 0, 9, 30), busy(16, 30, 19, 0), busy(18, 0, 20, 0)];
        let free = detect_free_intervals(&window, &events);
        assert_eq!(free, vec![iv(9, 30, 16, 30)]);
    }

    #[test]
    fn test_busy_covering_window_leaves_nothing() {
        let window = iv(9, 0, 17, 0);
        assert!(detect_free_intervals(&window, &[busy(8, 0, 18, 0)]).is_empty());
    }
}
