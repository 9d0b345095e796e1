use std::path::Path;

use clap::Args;
use slotwise_core::{rank_tasks, DurationEstimator};

use crate::sources::{load_config, load_tasks, TaskInput};

#[derive(Args)]
pub struct TasksArgs {
    /// Task source: "reminders" or a JSON file
    #[arg(long, default_value = "reminders")]
    tasks: TaskInput,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TasksArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut batch = load_tasks(&args.tasks, &config)?;

    let estimator = DurationEstimator::with_config(config.estimator.clone());
    batch.tasks = rank_tasks(&batch.tasks)
        .into_iter()
        .map(|task| estimator.apply(task))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
        return Ok(());
    }

    if batch.tasks.is_empty() {
        println!("No pending tasks.");
    }
    for (i, task) in batch.tasks.iter().enumerate() {
        let minutes = task
            .estimated_duration
            .map(|d| d.num_seconds() as f64 / 60.0)
            .unwrap_or_default();
        let due = task
            .due
            .map(|d| format!("  due {}", d.format("%Y-%m-%d %H:%M UTC")))
            .unwrap_or_default();
        println!(
            "{:>2}. [p{}] {} ({minutes} min){due}",
            i + 1,
            task.priority,
            task.title
        );
    }
    for rejected in &batch.rejected {
        println!(
            "rejected #{} {}: {}",
            rejected.index,
            rejected.title.as_deref().unwrap_or("<untitled>"),
            rejected.reason
        );
    }
    Ok(())
}
