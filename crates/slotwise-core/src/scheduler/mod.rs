//! Greedy first-fit scheduler.
//!
//! Walks ranked tasks against a working copy of the free intervals:
//! - each task takes the first interval (in start order) long enough for it
//! - the task is placed at the front of that interval, which shrinks
//! - an exhausted interval leaves the working set
//! - a task that fits nowhere is reported as unscheduled
//!
//! Single pass, no backtracking. A short task later in the ranking never
//! reclaims space taken by an earlier, longer one.

mod report;

use chrono::Duration;

use crate::task::{DurationEstimator, Task};
use crate::timeline::TimeInterval;

pub use report::{ScheduledAssignment, SchedulingReport};

/// First-fit scheduler over a list of free intervals.
#[derive(Debug, Clone, Default)]
pub struct GreedyScheduler {
    estimator: DurationEstimator,
    /// Remainders shorter than this are dropped along with empty ones
    min_remaining: Duration,
}

impl GreedyScheduler {
    /// Create a scheduler that only drops fully consumed intervals
    pub fn new(estimator: DurationEstimator) -> Self {
        Self {
            estimator,
            min_remaining: Duration::zero(),
        }
    }

    /// Also drop remainders shorter than `min_remaining`.
    pub fn with_min_remaining(mut self, min_remaining: Duration) -> Self {
        self.min_remaining = min_remaining;
        self
    }

    /// Assign `ranked` tasks, in order, to `free` intervals.
    ///
    /// `free` must be disjoint and sorted by start, as produced by
    /// [`crate::timeline::AvailabilityCalculator`]. The input slice is not
    /// touched; the scheduler works on its own copy.
    pub fn schedule(&self, ranked: &[Task], free: &[TimeInterval]) -> SchedulingReport {
        let mut slots: Vec<TimeInterval> = free.to_vec();
        let mut assignments = Vec::new();
        let mut unscheduled = Vec::new();

        for task in ranked {
            let task = self.estimator.apply(task.clone());
            let needed = self.estimator.estimate_or_keep(&task);

            let Some(index) = slots.iter().position(|slot| slot.fits(needed)) else {
                tracing::debug!(
                    title = %task.title,
                    minutes = needed.num_minutes(),
                    "no free interval fits"
                );
                unscheduled.push(task);
                continue;
            };

            let slot = slots[index];
            let (placed, rest) = match (
                TimeInterval::starting_at(slot.start(), needed),
                slot.shrink_front(needed),
            ) {
                (Ok(placed), Some(rest)) => (placed, rest),
                // only reachable with a negative pinned duration
                _ => {
                    unscheduled.push(task);
                    continue;
                }
            };

            tracing::debug!(title = %task.title, slot = %placed, "task placed");

            if rest.is_empty() || rest.duration() < self.min_remaining {
                slots.remove(index);
            } else {
                slots[index] = rest;
            }

            assignments.push(ScheduledAssignment::new(task, placed));
        }

        SchedulingReport::new(assignments, unscheduled, slots)
    }
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

    fn pinned(title: &str, minutes: i64) -> Task {
        Task::new(title)
            .unwrap()
            .with_estimated_duration(Duration::minutes(minutes))
    }

    #[test]
    fn test_first_fit_shrinks_and_moves_on() {
        let free = vec![iv(9, 0, 9, 45), iv(10, 0, 11, 0)];
        let tasks = vec![pinned("A", 30), pinned("B", 50)];

        let report = GreedyScheduler::default().schedule(&tasks, &free);

        assert!(report.is_complete());
        assert_eq!(report.assignments()[0].title(), "A");
        assert_eq!(*report.assignments()[0].interval(), iv(9, 0, 9, 30));
        assert_eq!(report.assignments()[1].title(), "B");
        assert_eq!(*report.assignments()[1].interval(), iv(10, 0, 10, 50));
        assert_eq!(report.remaining_free(), &[iv(9, 30, 9, 45), iv(10, 50, 11, 0)]);
    }

    #[test]
    fn test_short_remainders_are_dropped_with_minimum() {
        let free = vec![iv(9, 0, 9, 45), iv(10, 0, 11, 0)];
        let tasks = vec![pinned("A", 30), pinned("B", 50)];

        let report = GreedyScheduler::default()
            .with_min_remaining(Duration::minutes(15))
            .schedule(&tasks, &free);

        // 09:30-09:45 is exactly 15 minutes and survives; 10:50-11:00 does not
        assert_eq!(report.remaining_free(), &[iv(9, 30, 9, 45)]);

        let report = GreedyScheduler::default()
            .with_min_remaining(Duration::minutes(16))
            .schedule(&tasks, &free);
        assert!(report.remaining_free().is_empty());
        assert_eq!(report.scheduled_count(), 2);
    }

    #[test]
    fn test_task_that_does_not_fit_is_unscheduled() {
        let free = vec![iv(9, 0, 9, 20)];
        let report = GreedyScheduler::default().schedule(&[pinned("Too long", 30)], &free);

        assert_eq!(report.scheduled_count(), 0);
        assert_eq!(report.unscheduled()[0].title, "Too long");
        assert_eq!(report.remaining_free(), free.as_slice());
    }

    #[test]
    fn test_exact_fit_removes_interval() {
        let free = vec![iv(9, 0, 9, 30), iv(13, 0, 14, 0)];
        let report =
            GreedyScheduler::default().schedule(&[pinned("A", 30), pinned("B", 30)], &free);

        assert_eq!(*report.assignments()[0].interval(), iv(9, 0, 9, 30));
        assert_eq!(*report.assignments()[1].interval(), iv(13, 0, 13, 30));
        assert_eq!(report.remaining_free(), &[iv(13, 30, 14, 0)]);
    }

    #[test]
    fn test_no_backtracking() {
        // Long and Short use up the morning slot, so Medium no longer fits
        // anywhere even though it would have had Short not been placed first.
        let free = vec![iv(9, 0, 10, 0), iv(10, 30, 10, 50)];
        let tasks = vec![pinned("Long", 45), pinned("Short", 15), pinned("Medium", 30)];
        let report = GreedyScheduler::default().schedule(&tasks, &free);

        assert_eq!(*report.assignments()[1].interval(), iv(9, 45, 10, 0));
        assert_eq!(report.unscheduled().len(), 1);
        assert_eq!(report.unscheduled()[0].title, "Medium");
    }

    #[test]
    fn test_estimates_are_filled_in() {
        let free = vec![iv(9, 0, 17, 0)];
        let tasks = vec![Task::new("Quick call with John").unwrap()];
        let report = GreedyScheduler::default().schedule(&tasks, &free);

        let assignment = &report.assignments()[0];
        assert_eq!(assignment.task().estimated_duration, Some(Duration::minutes(15)));
        assert_eq!(*assignment.interval(), iv(9, 0, 9, 15));
    }

    #[test]
    fn test_rerun_is_identical() {
        let free = vec![iv(9, 0, 10, 0), iv(11, 0, 12, 0)];
        let tasks = vec![
            Task::new("Write report").unwrap(),
            Task::new("Email Ann").unwrap(),
            Task::new("Research options").unwrap().with_priority(9),
        ];
        let scheduler = GreedyScheduler::default();
        assert_eq!(scheduler.schedule(&tasks, &free), scheduler.schedule(&tasks, &free));
    }

    #[test]
    fn test_empty_inputs() {
        let report = GreedyScheduler::default().schedule(&[], &[]);
        assert!(report.is_complete());
        assert_eq!(report.total_scheduled(), Duration::zero());

        let report = GreedyScheduler::default().schedule(&[pinned("A", 10)], &[]);
        assert_eq!(report.unscheduled().len(), 1);
    }
}
