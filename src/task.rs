// Task model and text helpers

use serde::{Deserialize, Serialize};

/// A single todo item.
///
/// The id is the creation time in milliseconds since the Unix epoch and is
/// never reassigned. Text is stored already HTML-escaped; see [`escape_html`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

/// Counts derived from a task list. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

/// Escape the five HTML-sensitive characters in task text.
///
/// Stored text must be safe to splice into markup, so & < > " ' become
/// their entity forms. Everything else passes through unchanged.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time before Unix epoch")
        .as_millis() as i64
}
