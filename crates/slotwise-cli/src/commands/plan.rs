use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use clap::Args;
use serde::Serialize;
use slotwise_core::integrations::{persist_with_fallback, GoogleCalendar, RejectedRecord};
use slotwise_core::{plan_day, SchedulingReport, TimeInterval};

use crate::sources::{load_busy, load_config, load_tasks, BusyInput, TaskInput};

#[derive(Args)]
pub struct PlanArgs {
    /// Day to plan (YYYY-MM-DD, default: tomorrow)
    #[arg(long)]
    date: Option<NaiveDate>,
    /// Task source: "reminders" or a JSON file
    #[arg(long, default_value = "reminders")]
    tasks: TaskInput,
    /// Busy source: "google", "none" or a JSON file
    #[arg(long, default_value = "google")]
    busy: BusyInput,
    /// Create a calendar event for every assignment
    #[arg(long)]
    commit: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    date: NaiveDate,
    window: TimeInterval,
    report: &'a SchedulingReport,
    rejected: &'a [RejectedRecord],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    committed: Vec<CommitOutcome>,
}

#[derive(Serialize)]
struct CommitOutcome {
    title: String,
    calendar_id: Option<String>,
    event_id: Option<String>,
    error: Option<String>,
}

pub async fn run(args: PlanArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let day = config.working_day()?;
    let date = args.date.unwrap_or_else(|| day.tomorrow(Utc::now()));
    let window = day.window_for(date)?;

    let batch = load_tasks(&args.tasks, &config)?;
    for rejected in &batch.rejected {
        tracing::warn!(index = rejected.index, reason = %rejected.reason, "skipping task record");
    }
    let busy = load_busy(&args.busy, &config, &window).await?;

    let report = plan_day(&batch.tasks, &busy, &window, &config.planner_config())?;

    let committed = if args.commit {
        commit(&report, &config).await?
    } else {
        Vec::new()
    };

    if args.json {
        let output = PlanOutput {
            date,
            window,
            report: &report,
            rejected: &batch.rejected,
            committed,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let offset = day.offset;
    println!(
        "Plan for {date} ({}-{})",
        local(window.start(), offset),
        local(window.end(), offset)
    );
    if report.assignments().is_empty() {
        println!("  nothing scheduled");
    }
    for a in report.assignments() {
        println!(
            "  {}-{}  {} ({} min)",
            local(a.interval().start(), offset),
            local(a.interval().end(), offset),
            a.title(),
            a.interval().duration_minutes()
        );
    }
    if !report.unscheduled().is_empty() {
        println!("Unscheduled:");
        for task in report.unscheduled() {
            println!("  {}", task.title);
        }
    }
    for rejected in &batch.rejected {
        println!("Rejected record #{}: {}", rejected.index, rejected.reason);
    }
    for outcome in &committed {
        match (&outcome.event_id, &outcome.error) {
            (Some(id), _) => println!(
                "Created '{}' in {} ({id})",
                outcome.title,
                outcome.calendar_id.as_deref().unwrap_or("?")
            ),
            (None, Some(err)) => println!("Failed to create '{}': {err}", outcome.title),
            (None, None) => {}
        }
    }
    Ok(())
}

/// Persist every assignment. One failed event does not stop the rest.
async fn commit(
    report: &SchedulingReport,
    config: &slotwise_core::Config,
) -> Result<Vec<CommitOutcome>, Box<dyn std::error::Error>> {
    let calendar = GoogleCalendar::from_config(config)?;
    let mut outcomes = Vec::with_capacity(report.scheduled_count());

    for assignment in report.assignments() {
        let outcome = match persist_with_fallback(
            &calendar,
            &config.calendar.calendar_id,
            config.fallback_calendar(),
            assignment,
        )
        .await
        {
            Ok(event) => CommitOutcome {
                title: assignment.title().to_string(),
                calendar_id: Some(event.calendar_id),
                event_id: Some(event.event_id),
                error: None,
            },
            Err(e) => {
                tracing::error!(title = assignment.title(), error = %e, "failed to create event");
                CommitOutcome {
                    title: assignment.title().to_string(),
                    calendar_id: None,
                    event_id: None,
                    error: Some(e.to_string()),
                }
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

fn local(at: DateTime<Utc>, offset: FixedOffset) -> String {
    at.with_timezone(&offset).format("%H:%M").to_string()
}
