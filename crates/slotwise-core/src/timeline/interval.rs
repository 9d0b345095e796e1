//! Half-open time intervals.
//!
//! A [`TimeInterval`] is immutable once built. Duration is always derived from
//! the endpoints, so there is no way to get the two out of sync; operations
//! that "move" an interval return a new value.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A half-open interval `[start, end)` with `end >= start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = ValidationError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.start, raw.end)
    }
}

impl TimeInterval {
    /// Create a new interval.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidInterval`] when `end < start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    /// Interval of `duration` starting at `start`. Negative durations are rejected.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Result<Self, ValidationError> {
        Self::new(start, start + duration)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Get duration in whole minutes
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether a block of `candidate` length fits inside this interval.
    pub fn fits(&self, candidate: Duration) -> bool {
        candidate <= self.duration()
    }

    /// Whether the two intervals share any instant. Touching ends do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `other` lies entirely within this interval.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The remainder after consuming `used` from the front.
    ///
    /// Returns `None` if `used` does not fit.
    pub fn shrink_front(&self, used: Duration) -> Option<TimeInterval> {
        if used < Duration::zero() || !self.fits(used) {
            return None;
        }
        Some(Self {
            start: self.start + used,
            end: self.end,
        })
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}–{}",
            self.start.format("%Y-%m-%d %H:%M"),
            self.end.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    #[test]
    fn test_rejects_end_before_start() {
        let err = TimeInterval::new(at(10, 0), at(9, 0)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInterval { .. }));
    }

    #[test]
    fn test_zero_length_is_allowed() {
        let iv = TimeInterval::new(at(9, 0), at(9, 0)).unwrap();
        assert!(iv.is_empty());
        assert_eq!(iv.duration(), Duration::zero());
    }

    #[test]
    fn test_fits_is_inclusive() {
        let iv = TimeInterval::new(at(9, 0), at(9, 30)).unwrap();
        assert!(iv.fits(Duration::minutes(30)));
        assert!(!iv.fits(Duration::minutes(31)));
    }

    #[test]
    fn test_shrink_front_keeps_end_and_recomputes_duration() {
        let iv = TimeInterval::new(at(9, 0), at(9, 45)).unwrap();
        let rest = iv.shrink_front(Duration::minutes(30)).unwrap();
        assert_eq!(rest.start(), at(9, 30));
        assert_eq!(rest.end(), at(9, 45));
        assert_eq!(rest.duration_minutes(), 15);
        // original value untouched
        assert_eq!(iv.start(), at(9, 0));

        assert!(iv.shrink_front(Duration::minutes(46)).is_none());
    }

    #[test]
    fn test_overlap_and_containment() {
        let a = TimeInterval::new(at(9, 0), at(10, 0)).unwrap();
        let b = TimeInterval::new(at(10, 0), at(11, 0)).unwrap();
        let c = TimeInterval::new(at(9, 30), at(9, 45)).unwrap();

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(a.contains(&c));
        assert!(!c.contains(&a));
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: TimeInterval = serde_json::from_str(
            r#"{"start":"2025-03-10T09:00:00+10:00","end":"2025-03-10T10:00:00+10:00"}"#,
        )
        .unwrap();
        assert_eq!(ok.duration_minutes(), 60);

        let bad = serde_json::from_str::<TimeInterval>(
            r#"{"start":"2025-03-10T10:00:00Z","end":"2025-03-10T09:00:00Z"}"#,
        );
        assert!(bad.is_err());
    }
}
