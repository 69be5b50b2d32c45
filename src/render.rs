// Terminal rendering of the task list

use crate::task::{Stats, Task};
use chrono::{Local, LocalResult, TimeZone};
use colored::Colorize;

/// Render the full view: one line per task plus the counters line.
///
/// Pure function of its inputs. An empty list renders the empty-state line
/// in place of task lines; the counters line renders either way.
pub fn render(tasks: &[Task], stats: Stats) -> String {
    let mut out = String::new();

    if tasks.is_empty() {
        out.push_str("No tasks yet. Add one to get started.\n");
    } else {
        for task in tasks {
            out.push_str(&render_task(task));
            out.push('\n');
        }
    }

    out.push_str(&render_stats(stats));
    out.push('\n');
    out
}

/// Render the counters line: total, completed, remaining.
pub fn render_stats(stats: Stats) -> String {
    format!(
        "{} total, {} completed, {} remaining",
        stats.total, stats.completed, stats.remaining
    )
}

fn render_task(task: &Task) -> String {
    let created = format_created(task.id);
    if task.completed {
        format!(
            "{} {}  {}  ({})",
            "[x]".green(),
            task.id,
            task.text.as_str().strikethrough().dimmed(),
            created.dimmed()
        )
    } else {
        format!("[ ] {}  {}  ({})", task.id, task.text, created.dimmed())
    }
}

/// Format a task id (creation time in ms) as local wall-clock time.
fn format_created(id: i64) -> String {
    match Local.timestamp_millis_opt(id) {
        LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        _ => "unknown time".to_string(),
    }
}
