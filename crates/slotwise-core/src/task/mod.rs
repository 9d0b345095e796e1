//! Pending tasks and the logic that prepares them for planning.
//!
//! Tasks arrive from a task source already converted to this strongly typed
//! form. The estimator fills in `estimated_duration` once; after a task has
//! been handed to the scheduler it is treated as a value and never changed.

pub mod estimate;
pub mod rank;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use estimate::{DurationEstimator, EstimatorConfig};
pub use rank::rank_tasks;

/// A pending task waiting for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Task title, never blank once validated
    pub title: String,
    /// Free-text notes, may be empty
    #[serde(default)]
    pub notes: String,
    /// Higher is more urgent
    #[serde(default)]
    pub priority: i32,
    /// Due timestamp; absent sorts after every dated task
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
    /// Derived by the duration estimator, not user supplied
    #[serde(
        default,
        rename = "estimated_minutes",
        with = "minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_duration: Option<Duration>,
}

impl Task {
    /// Create a validated task with empty notes, priority 0 and no due date.
    pub fn new(title: impl Into<String>) -> Result<Self, ValidationError> {
        let task = Task {
            title: title.into(),
            notes: String::new(),
            priority: 0,
            due: None,
            estimated_duration: None,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due(mut self, due: DateTime<Utc>) -> Self {
        self.due = Some(due);
        self
    }

    /// Pin the duration instead of letting the estimator derive it.
    pub fn with_estimated_duration(mut self, duration: Duration) -> Self {
        self.estimated_duration = Some(duration);
        self
    }

    /// Check the task can enter ranking.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTask`] for a blank title or a
    /// negative pinned duration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::InvalidTask("title is empty".to_string()));
        }
        if let Some(d) = self.estimated_duration {
            if d < Duration::zero() {
                return Err(ValidationError::InvalidTask(format!(
                    "'{}' has a negative estimated duration",
                    self.title
                )));
            }
        }
        Ok(())
    }
}

/// Serializes `Option<Duration>` as fractional minutes.
mod minutes {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => s.serialize_some(&(d.num_seconds() as f64 / 60.0)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        let minutes: Option<f64> = Option::deserialize(d)?;
        Ok(minutes.map(|m| Duration::seconds((m * 60.0).round() as i64)))
    }
}
