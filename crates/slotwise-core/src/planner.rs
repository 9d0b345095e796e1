//! One-call day planning.
//!
//! Validates tasks, computes availability, ranks, and runs the greedy
//! scheduler. No I/O happens here; sources and sinks live in
//! [`crate::integrations`].

use chrono::Duration;

use crate::error::Result;
use crate::scheduler::{GreedyScheduler, SchedulingReport};
use crate::task::{rank_tasks, DurationEstimator, EstimatorConfig, Task};
use crate::timeline::{AvailabilityCalculator, BusyInterval, TimeInterval};

/// Planner configuration
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Free gaps shorter than this are never offered to tasks
    pub min_slot: Duration,
    pub estimator: EstimatorConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            min_slot: Duration::minutes(15),
            estimator: EstimatorConfig::default(),
        }
    }
}

/// Plan `tasks` into the free parts of `window`.
///
/// # Errors
///
/// Returns a validation error if any task has a blank title. Placement
/// itself never fails; tasks without room end up in
/// [`SchedulingReport::unscheduled`].
pub fn plan_day(
    tasks: &[Task],
    busy: &[BusyInterval],
    window: &TimeInterval,
    config: &PlannerConfig,
) -> Result<SchedulingReport> {
    for task in tasks {
        task.validate()?;
    }

    let free = AvailabilityCalculator::new()
        .with_min_slot(config.min_slot)
        .free_intervals(window, busy);

    let ranked = rank_tasks(tasks);

    // Shrunk intervals stay usable down to zero length; `min_slot` only
    // filters the gaps between busy periods.
    let report = GreedyScheduler::new(DurationEstimator::with_config(config.estimator.clone()))
        .schedule(&ranked, &free);

    tracing::info!(
        window = %window,
        busy = busy.len(),
        free = free.len(),
        scheduled = report.scheduled_count(),
        unscheduled = report.unscheduled().len(),
        "day planned"
    );

    Ok(report)
}
