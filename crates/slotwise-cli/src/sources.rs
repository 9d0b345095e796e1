//! Resolves CLI source arguments into collaborators.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use slotwise_core::integrations::{
    BusySource, GoogleCalendar, JsonFileBusySource, JsonFileTaskSource, RemindersSource,
    TaskBatch, TaskSource,
};
use slotwise_core::{BusyInterval, Config, TimeInterval};

/// Where tasks come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskInput {
    Reminders,
    File(PathBuf),
}

impl FromStr for TaskInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("empty task source".into()),
            "reminders" => Ok(TaskInput::Reminders),
            path => Ok(TaskInput::File(PathBuf::from(path))),
        }
    }
}

/// Where busy periods come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusyInput {
    Google,
    None,
    File(PathBuf),
}

impl FromStr for BusyInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("empty busy source".into()),
            "google" => Ok(BusyInput::Google),
            "none" => Ok(BusyInput::None),
            path => Ok(BusyInput::File(PathBuf::from(path))),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    })
}

/// Read tasks. An unavailable source counts as no tasks.
pub fn load_tasks(
    input: &TaskInput,
    config: &Config,
) -> Result<TaskBatch, Box<dyn std::error::Error>> {
    let offset = config.working_day()?.offset;
    let result = match input {
        TaskInput::Reminders => {
            RemindersSource::new(&config.reminders.list_name, offset).fetch_tasks()
        }
        TaskInput::File(path) => JsonFileTaskSource::new(path, offset).fetch_tasks(),
    };

    match result {
        Ok(batch) => Ok(batch),
        Err(e) if e.is_unavailable() => {
            tracing::warn!(error = %e, "task source unavailable, continuing with no tasks");
            Ok(TaskBatch::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Read busy periods for `window`. An unavailable source counts as none.
pub async fn load_busy(
    input: &BusyInput,
    config: &Config,
    window: &TimeInterval,
) -> Result<Vec<BusyInterval>, Box<dyn std::error::Error>> {
    let result = match input {
        BusyInput::None => return Ok(Vec::new()),
        BusyInput::File(path) => JsonFileBusySource::new(path).fetch_busy(window).await,
        BusyInput::Google => {
            GoogleCalendar::from_config(config)?
                .busy_source(&config.calendar.calendar_id)
                .fetch_busy(window)
                .await
        }
    };

    match result {
        Ok(busy) => Ok(busy),
        Err(e) if e.is_unavailable() => {
            tracing::warn!(error = %e, "busy source unavailable, treating the day as free");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_source_arguments() {
        assert_eq!("reminders".parse(), Ok(TaskInput::Reminders));
        assert_eq!(
            "tasks.json".parse(),
            Ok(TaskInput::File(PathBuf::from("tasks.json")))
        );
        assert_eq!("google".parse(), Ok(BusyInput::Google));
        assert_eq!("none".parse(), Ok(BusyInput::None));
        assert!("".parse::<BusyInput>().is_err());
    }
}
