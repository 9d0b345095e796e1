//! Apple Reminders task source.
//!
//! Dumps the incomplete reminders of one list through `osascript` using
//! JavaScript for Automation, which serializes with `JSON.stringify` so
//! titles containing quotes survive intact.

use std::process::Command;

use chrono::FixedOffset;

use super::task_records::{parse_task_records, PriorityScale, TaskRecord};
use super::traits::{TaskBatch, TaskSource};
use crate::error::IntegrationError;

/// Reads pending reminders from a named list in the Reminders app.
pub struct RemindersSource {
    list_name: String,
    offset: FixedOffset,
    program: String,
}

impl RemindersSource {
    pub fn new(list_name: impl Into<String>, offset: FixedOffset) -> Self {
        Self {
            list_name: list_name.into(),
            offset,
            program: "osascript".to_string(),
        }
    }

    /// Use a different interpreter binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn script(&self) -> String {
        // serde_json quoting doubles as a JavaScript string literal
        let list = serde_json::to_string(&self.list_name).unwrap_or_else(|_| "\"\"".to_string());
        format!(
            r#"const app = Application("Reminders");
const items = app.lists.byName({list}).reminders.whose({{completed: false}})();
JSON.stringify(items.map(r => ({{
  title: r.name(),
  notes: r.body() || "",
  due: r.dueDate() ? r.dueDate().toISOString() : null,
  priority: r.priority()
}})));"#
        )
    }

    /// Convert the script's stdout into a batch.
    pub fn parse_output(&self, stdout: &str) -> Result<TaskBatch, IntegrationError> {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Ok(TaskBatch::default());
        }
        let records: Vec<TaskRecord> =
            serde_json::from_str(trimmed).map_err(|e| IntegrationError::Parse {
                source_name: "reminders".to_string(),
                message: e.to_string(),
            })?;
        Ok(parse_task_records(
            records,
            PriorityScale::AppleReminders,
            self.offset,
        ))
    }
}

impl TaskSource for RemindersSource {
    fn name(&self) -> &str {
        "reminders"
    }

    fn fetch_tasks(&self) -> Result<TaskBatch, IntegrationError> {
        tracing::debug!(list = %self.list_name, "reading reminders");

        let output = Command::new(&self.program)
            .args(["-l", "JavaScript", "-e", &self.script()])
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => IntegrationError::Unavailable {
                    source_name: "reminders".to_string(),
                    message: format!("{} not found", self.program),
                },
                _ => IntegrationError::Io(e),
            })?;

        if !output.status.success() {
            return Err(IntegrationError::Unavailable {
                source_name: "reminders".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let batch = self.parse_output(&String::from_utf8_lossy(&output.stdout))?;
        tracing::info!(
            list = %self.list_name,
            tasks = batch.tasks.len(),
            rejected = batch.rejected.len(),
            "reminders loaded"
        );
        Ok(batch)
    }
}
