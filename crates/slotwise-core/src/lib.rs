//! # Slotwise Core Library
//!
//! This library places a day's pending tasks onto the free parts of a
//! calendar. It follows a CLI-first layout: all logic lives here and the
//! `slotwise` binary is a thin layer that wires sources and sinks to it.
//!
//! ## Architecture
//!
//! - **Timeline**: immutable intervals, working-day windows, and free interval
//!   detection between busy periods
//! - **Task**: the task model, content-based duration estimation and ranking
//! - **Scheduler**: single-pass greedy first-fit placement and its report
//! - **Planner**: validation plus the full availability → rank → schedule flow
//! - **Storage**: TOML-based configuration
//! - **Integrations**: task sources (Apple Reminders, JSON files), busy
//!   sources and the Google Calendar sink
//!
//! The planning core is synchronous and performs no I/O; identical inputs
//! always produce identical reports.
//!
//! ## Key Components
//!
//! - [`AvailabilityCalculator`]: busy intervals → free intervals
//! - [`DurationEstimator`]: task text → estimated duration
//! - [`GreedyScheduler`]: free intervals + ranked tasks → [`SchedulingReport`]
//! - [`plan_day`]: everything above in one call
//! - [`Config`]: application configuration management

pub mod error;
pub mod integrations;
pub mod planner;
pub mod scheduler;
pub mod storage;
pub mod task;
pub mod timeline;

pub use error::{ConfigError, CoreError, IntegrationError, ValidationError};
pub use planner::{plan_day, PlannerConfig};
pub use scheduler::{GreedyScheduler, ScheduledAssignment, SchedulingReport};
pub use storage::Config;
pub use task::{rank_tasks, DurationEstimator, EstimatorConfig, Task};
pub use timeline::{AvailabilityCalculator, BusyInterval, TimeInterval, WorkingDay};
