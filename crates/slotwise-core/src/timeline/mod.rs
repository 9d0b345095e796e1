//! Time primitives for a single planning day.
//!
//! This module provides:
//! - Immutable half-open intervals
//! - Free interval detection between busy periods
//! - Working-day window construction from wall-clock bounds

mod gap;
mod interval;
mod window;

pub use gap::{detect_free_intervals, AvailabilityCalculator, BusyInterval};
pub use interval::TimeInterval;
pub use window::{parse_utc_offset, WorkingDay};
