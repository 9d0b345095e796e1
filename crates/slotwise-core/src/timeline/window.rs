//! Working-day window construction.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use super::interval::TimeInterval;
use crate::error::ValidationError;

/// Wall-clock bounds of a working day in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingDay {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub offset: FixedOffset,
}

impl WorkingDay {
    pub fn new(start: NaiveTime, end: NaiveTime, offset: FixedOffset) -> Self {
        Self { start, end, offset }
    }

    /// Parse `HH:MM` bounds and a `±HH:MM` offset.
    pub fn parse(start: &str, end: &str, offset: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            start: parse_clock(start, "day.start")?,
            end: parse_clock(end, "day.end")?,
            offset: parse_utc_offset(offset)?,
        })
    }

    /// The window for `date`.
    ///
    /// An end at or before the start means the working day runs past midnight.
    pub fn window_for(&self, date: NaiveDate) -> Result<TimeInterval, ValidationError> {
        let start = self.local(date, self.start)?;
        let mut end = self.local(date, self.end)?;
        if self.end <= self.start {
            end += Duration::days(1);
        }
        TimeInterval::new(start, end)
    }

    /// The calendar date after the one `now` falls on in this offset.
    pub fn tomorrow(&self, now: DateTime<Utc>) -> NaiveDate {
        let today = now.with_timezone(&self.offset).date_naive();
        today.succ_opt().unwrap_or(today)
    }

    fn local(&self, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Utc>, ValidationError> {
        self.offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "day".to_string(),
                message: format!("{date} {time} does not exist in offset {}", self.offset),
            })
    }
}

fn parse_clock(value: &str, field: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| ValidationError::InvalidValue {
        field: field.to_string(),
        message: format!("expected HH:MM, got '{value}' ({e})"),
    })
}

/// Parse a `±HH:MM` (or `Z`) UTC offset.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset, ValidationError> {
    let invalid = || ValidationError::InvalidValue {
        field: "day.utc_offset".to_string(),
        message: format!("expected ±HH:MM, got '{value}'"),
    };

    let value = value.trim();
    if value.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, rest) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        return Err(invalid());
    };
    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if !(0..=23).contains(&hours) || !(0..=59).contains(&minutes) {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
