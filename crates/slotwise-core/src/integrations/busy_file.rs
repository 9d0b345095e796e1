//! Busy periods read from a JSON file.
//!
//! The file holds an array of `{"start": …, "end": …, "summary": …}`
//! objects with RFC 3339 timestamps; `summary` is optional.

use std::path::PathBuf;

use super::traits::BusySource;
use crate::error::IntegrationError;
use crate::timeline::{BusyInterval, TimeInterval};

pub struct JsonFileBusySource {
    path: PathBuf,
}

impl JsonFileBusySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BusySource for JsonFileBusySource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch_busy(&self, window: &TimeInterval) -> Result<Vec<BusyInterval>, IntegrationError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let busy: Vec<BusyInterval> =
            serde_json::from_str(&content).map_err(|e| IntegrationError::Parse {
                source_name: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            path = %self.path.display(),
            total = busy.len(),
            in_window = busy.iter().filter(|b| b.interval.overlaps(window)).count(),
            "busy intervals loaded"
        );
        Ok(busy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_reads_and_validates_intervals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("busy.json");
        std::fs::write(
            &path,
            r#"[
                {"start":"2025-03-10T10:00:00+10:00","end":"2025-03-10T10:30:00+10:00","summary":"Standup"},
                {"start":"2025-03-10T13:00:00+10:00","end":"2025-03-10T14:00:00+10:00"}
            ]"#,
        )
        .unwrap();

        let window = TimeInterval::new(
            Utc.with_ymd_and_hms(2025, 3, 9, 23, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, 7, 0, 0).unwrap(),
        )
        .unwrap();
        let busy = JsonFileBusySource::new(&path).fetch_busy(&window).await.unwrap();

        assert_eq!(busy.len(), 2);
        assert_eq!(busy[0].summary.as_deref(), Some("Standup"));
        assert_eq!(busy[0].interval.duration_minutes(), 30);
        assert!(busy[1].summary.is_none());
    }

    #[tokio::test]
    async fn test_inverted_interval_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("busy.json");
        std::fs::write(
            &path,
            r#"[{"start":"2025-03-10T11:00:00Z","end":"2025-03-10T10:00:00Z"}]"#,
        )
        .unwrap();

        let window = TimeInterval::new(
            Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap(),
        )
        .unwrap();
        let err = JsonFileBusySource::new(&path).fetch_busy(&window).await.unwrap_err();
        assert!(matches!(err, IntegrationError::Parse { .. }));
    }
}
