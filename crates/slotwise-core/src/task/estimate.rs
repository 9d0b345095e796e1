//! Content-based duration estimation.
//!
//! The policy is a fixed sequence of tiers:
//!
//! 1. every task starts at the base duration (30 min)
//! 2. a "long" keyword in title or notes sets it to 60 min
//! 3. a "short" keyword sets it to 15 min, overriding tier 2 when both match
//! 4. priority above the threshold multiplies the result by 1.5
//!
//! Keyword matching is a case-insensitive substring test.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::Task;

/// Largest multiplier a config may carry.
pub const MAX_PRIORITY_MULTIPLIER: f64 = 100.0;

/// Estimates are capped here; nothing this long fits a working day.
const MAX_ESTIMATE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Tunable estimator policy. Defaults reproduce the built-in policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    #[serde(default = "default_base_minutes")]
    pub base_minutes: u32,
    #[serde(default = "default_long_minutes")]
    pub long_minutes: u32,
    #[serde(default = "default_short_minutes")]
    pub short_minutes: u32,
    #[serde(default = "default_long_keywords")]
    pub long_keywords: Vec<String>,
    #[serde(default = "default_short_keywords")]
    pub short_keywords: Vec<String>,
    /// Priorities strictly above this get the multiplier
    #[serde(default = "default_high_priority_threshold")]
    pub high_priority_threshold: i32,
    #[serde(default = "default_high_priority_multiplier")]
    pub high_priority_multiplier: f64,
}

fn default_base_minutes() -> u32 {
    30
}
fn default_long_minutes() -> u32 {
    60
}
fn default_short_minutes() -> u32 {
    15
}
fn default_long_keywords() -> Vec<String> {
    ["meeting", "workshop", "study", "research", "write", "develop", "create"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_short_keywords() -> Vec<String> {
    ["call", "check", "review", "reply", "email", "quick", "brief"]
        .into_iter()
        .map(String::from)
        .collect()
}
fn default_high_priority_threshold() -> i32 {
    5
}
fn default_high_priority_multiplier() -> f64 {
    1.5
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            base_minutes: default_base_minutes(),
            long_minutes: default_long_minutes(),
            short_minutes: default_short_minutes(),
            long_keywords: default_long_keywords(),
            short_keywords: default_short_keywords(),
            high_priority_threshold: default_high_priority_threshold(),
            high_priority_multiplier: default_high_priority_multiplier(),
        }
    }
}

/// Estimates how long a task will take from its text and priority.
#[derive(Debug, Clone)]
pub struct DurationEstimator {
    config: EstimatorConfig,
    // lowercased copies of the keyword sets
    long_keywords: Vec<String>,
    short_keywords: Vec<String>,
}

impl DurationEstimator {
    /// Create an estimator with the default policy
    pub fn new() -> Self {
        Self::with_config(EstimatorConfig::default())
    }

    /// Create with custom config
    pub fn with_config(config: EstimatorConfig) -> Self {
        let lower = |words: &[String]| {
            words
                .iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };
        Self {
            long_keywords: lower(&config.long_keywords),
            short_keywords: lower(&config.short_keywords),
            config,
        }
    }

    /// Estimate the duration of `task`. Pure; ignores any existing estimate.
    pub fn estimate(&self, task: &Task) -> Duration {
        let text = format!("{}\n{}", task.title, task.notes).to_lowercase();

        let mut minutes = self.config.base_minutes;
        if contains_any(&text, &self.long_keywords) {
            minutes = self.config.long_minutes;
        }
        // Applied after the long tier on purpose: short wins when both match.
        if contains_any(&text, &self.short_keywords) {
            minutes = self.config.short_minutes;
        }

        let mut seconds = i64::from(minutes) * 60;
        if task.priority > self.config.high_priority_threshold {
            seconds = scale(seconds, self.config.high_priority_multiplier);
        }

        Duration::seconds(seconds.min(MAX_ESTIMATE_SECONDS))
    }

    /// The task's pinned estimate, or a fresh one.
    pub fn estimate_or_keep(&self, task: &Task) -> Duration {
        task.estimated_duration.unwrap_or_else(|| self.estimate(task))
    }

    /// Return `task` with `estimated_duration` filled in if it was empty.
    pub fn apply(&self, mut task: Task) -> Task {
        if task.estimated_duration.is_none() {
            task.estimated_duration = Some(self.estimate(&task));
        }
        task
    }
}

impl Default for DurationEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Multiply and round, saturating at the estimate cap. NaN leaves the
/// duration unscaled.
fn scale(seconds: i64, multiplier: f64) -> i64 {
    let scaled = (seconds as f64 * multiplier).round();
    if scaled.is_nan() {
        tracing::warn!(multiplier, "ignoring non-numeric priority multiplier");
        return seconds;
    }
    scaled.clamp(0.0, MAX_ESTIMATE_SECONDS as f64) as i64
}

fn contains_any(text: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| text.contains(k.as_str()))
}
