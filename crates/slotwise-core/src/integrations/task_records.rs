//! Boundary validation for loosely typed task records.
//!
//! Every task source produces [`TaskRecord`]s and runs them through
//! [`parse_task_records`]; only the records that convert cleanly become
//! [`Task`]s.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

use super::traits::{RejectedRecord, TaskBatch, TaskSource};
use crate::error::IntegrationError;
use crate::task::Task;

/// A task as an external source describes it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// How a source expresses priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityScale {
    /// Higher is more urgent, taken as-is
    Urgency,
    /// Apple Reminders: 0 none, 1 highest … 9 lowest
    AppleReminders,
}

impl PriorityScale {
    fn convert(self, raw: i64) -> Result<i32, String> {
        match self {
            PriorityScale::Urgency => {
                i32::try_from(raw).map_err(|_| format!("priority {raw} out of range"))
            }
            PriorityScale::AppleReminders => match raw {
                0 => Ok(0),
                1..=9 => Ok(10 - raw as i32),
                _ => Err(format!("priority {raw} outside 0-9")),
            },
        }
    }
}

/// Validate and convert raw records. Due dates without an offset are read in
/// `offset`.
pub fn parse_task_records(
    records: Vec<TaskRecord>,
    scale: PriorityScale,
    offset: FixedOffset,
) -> TaskBatch {
    let mut batch = TaskBatch::default();

    for (index, record) in records.into_iter().enumerate() {
        let title = record.title.clone();
        match convert(record, scale, offset) {
            Ok(task) => batch.tasks.push(task),
            Err(reason) => {
                tracing::warn!(index, title = ?title, %reason, "task record rejected");
                batch.rejected.push(RejectedRecord {
                    index,
                    title,
                    reason,
                });
            }
        }
    }

    batch
}

fn convert(record: TaskRecord, scale: PriorityScale, offset: FixedOffset) -> Result<Task, String> {
    let title = record.title.unwrap_or_default();
    let mut task = Task::new(title.trim()).map_err(|e| e.to_string())?;

    task.notes = record.notes.unwrap_or_default();
    task.priority = scale.convert(record.priority.unwrap_or(0))?;
    task.due = match record.due.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            parse_due(raw, offset).ok_or_else(|| format!("unparseable due date '{raw}'"))?,
        ),
    };

    Ok(task)
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DD`.
pub fn parse_due(raw: &str, offset: FixedOffset) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Reads task records from a JSON array on disk.
pub struct JsonFileTaskSource {
    path: PathBuf,
    offset: FixedOffset,
}

impl JsonFileTaskSource {
    pub fn new(path: impl Into<PathBuf>, offset: FixedOffset) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }
}

impl TaskSource for JsonFileTaskSource {
    fn name(&self) -> &str {
        "file"
    }

    fn fetch_tasks(&self) -> Result<TaskBatch, IntegrationError> {
        let content = std::fs::read_to_string(&self.path)?;
        let records: Vec<TaskRecord> =
            serde_json::from_str(&content).map_err(|e| IntegrationError::Parse {
                source_name: self.path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(parse_task_records(records, PriorityScale::Urgency, self.offset))
    }
}
