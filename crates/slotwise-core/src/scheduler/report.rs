//! Outcome of one scheduling run.

use chrono::Duration;
use serde::Serialize;

use crate::task::Task;
use crate::timeline::TimeInterval;

/// A task placed into a concrete time range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledAssignment {
    task: Task,
    #[serde(flatten)]
    interval: TimeInterval,
}

impl ScheduledAssignment {
    pub(crate) fn new(task: Task, interval: TimeInterval) -> Self {
        Self { task, interval }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    pub fn title(&self) -> &str {
        &self.task.title
    }
}

/// Assignments in the order they were made, plus the tasks that did not fit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulingReport {
    assignments: Vec<ScheduledAssignment>,
    unscheduled: Vec<Task>,
    remaining_free: Vec<TimeInterval>,
}

impl SchedulingReport {
    pub(crate) fn new(
        assignments: Vec<ScheduledAssignment>,
        unscheduled: Vec<Task>,
        remaining_free: Vec<TimeInterval>,
    ) -> Self {
        Self {
            assignments,
            unscheduled,
            remaining_free,
        }
    }

    pub fn assignments(&self) -> &[ScheduledAssignment] {
        &self.assignments
    }

    pub fn unscheduled(&self) -> &[Task] {
        &self.unscheduled
    }

    /// Free intervals left over after every assignment.
    pub fn remaining_free(&self) -> &[TimeInterval] {
        &self.remaining_free
    }

    pub fn scheduled_count(&self) -> usize {
        self.assignments.len()
    }

    /// Whether every task found a slot.
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }

    pub fn total_scheduled(&self) -> Duration {
        self.assignments
            .iter()
            .fold(Duration::zero(), |acc, a| acc + a.interval.duration())
    }
}
