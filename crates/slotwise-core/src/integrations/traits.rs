use serde::Serialize;

use crate::error::IntegrationError;
use crate::scheduler::ScheduledAssignment;
use crate::task::Task;
use crate::timeline::{BusyInterval, TimeInterval};

/// Supplies pending tasks, already validated.
///
/// Records that cannot become a [`Task`] are reported in
/// [`TaskBatch::rejected`] instead of reaching the planner.
pub trait TaskSource {
    /// Unique identifier (e.g. "reminders", "file").
    fn name(&self) -> &str;

    fn fetch_tasks(&self) -> Result<TaskBatch, IntegrationError>;
}

/// Supplies existing commitments for a window. May return nothing, and may
/// return intervals unsorted, overlapping, or reaching outside the window.
pub trait BusySource {
    fn name(&self) -> &str;

    async fn fetch_busy(&self, window: &TimeInterval) -> Result<Vec<BusyInterval>, IntegrationError>;
}

/// Persists assignments as calendar events.
///
/// The target calendar is an argument of every call; sinks hold no default
/// calendar of their own.
pub trait AssignmentSink {
    fn name(&self) -> &str;

    async fn persist(
        &self,
        calendar_id: &str,
        assignment: &ScheduledAssignment,
    ) -> Result<PersistedEvent, IntegrationError>;
}

/// Result of a task source read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskBatch {
    pub tasks: Vec<Task>,
    pub rejected: Vec<RejectedRecord>,
}

/// A source record that failed boundary validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Position in the source listing
    pub index: usize,
    pub title: Option<String>,
    pub reason: String,
}

/// An event created by a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistedEvent {
    pub calendar_id: String,
    pub event_id: String,
    pub html_link: Option<String>,
}

/// Persist into `calendar_id`, retrying once on `fallback` if that fails.
pub async fn persist_with_fallback<S: AssignmentSink>(
    sink: &S,
    calendar_id: &str,
    fallback: Option<&str>,
    assignment: &ScheduledAssignment,
) -> Result<PersistedEvent, IntegrationError> {
    match sink.persist(calendar_id, assignment).await {
        Ok(event) => Ok(event),
        Err(err) => match fallback {
            Some(fallback) if fallback != calendar_id => {
                tracing::warn!(
                    sink = sink.name(),
                    calendar = calendar_id,
                    fallback,
                    error = %err,
                    "insert failed, retrying on fallback calendar"
                );
                sink.persist(fallback, assignment).await
            }
            _ => Err(err),
        },
    }
}
