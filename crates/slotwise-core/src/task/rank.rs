//! Task ranking.

use std::cmp::Ordering;

use super::Task;

/// Order tasks for placement: priority descending, then due date ascending
/// with undated tasks last. The sort is stable, so ties keep input order.
pub fn rank_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut ranked = tasks.to_vec();
    ranked.sort_by(compare);
    ranked
}

fn compare(a: &Task, b: &Task) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| match (a.due, b.due) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}
