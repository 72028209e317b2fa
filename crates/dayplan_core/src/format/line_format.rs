//! Timestamp line rendering for day planner notes.
//!
//! # Responsibility
//! - Render the exact text a task line carries after a reschedule.
//!
//! # Invariants
//! - Rendering is pure and never emits a newline.
//! - List tokens and task text are carried over verbatim.

use crate::model::task::{Task, Timestamp, MINUTES_PER_DAY};

/// Default separator between start and end clock values.
pub const DEFAULT_TIME_SEPARATOR: &str = " - ";

/// Renders a task line for a new timestamp.
pub trait LineSerializer {
    fn render(&self, task: &Task, timestamp: &Timestamp) -> String;
}

impl<L: LineSerializer + ?Sized> LineSerializer for std::sync::Arc<L> {
    fn render(&self, task: &Task, timestamp: &Timestamp) -> String {
        (**self).render(task, timestamp)
    }
}

/// `- [ ] 09:00 - 09:30 Text` style line format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPlannerLineFormat {
    separator: String,
}

impl Default for DayPlannerLineFormat {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SEPARATOR)
    }
}

impl DayPlannerLineFormat {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl LineSerializer for DayPlannerLineFormat {
    fn render(&self, task: &Task, timestamp: &Timestamp) -> String {
        let mut line = format!(
            "{}{}{}{}",
            task.list_tokens,
            format_clock(timestamp.start_minutes),
            self.separator,
            format_clock(timestamp.end_minutes()),
        );
        if !task.text.is_empty() {
            line.push(' ');
            line.push_str(&task.text);
        }
        // Task text comes from a single note line; keep the output on one line.
        line.replace(['\n', '\r'], " ")
    }
}

/// Formats minutes since midnight as `HH:MM`, wrapping past midnight.
pub fn format_clock(minutes: u32) -> String {
    let in_day = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", in_day / 60, in_day % 60)
}
