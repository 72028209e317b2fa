//! Planner task domain model.
//!
//! # Responsibility
//! - Define the task record indexed from a daily note line.
//! - Define the start/duration timestamp value carried by each task.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `location.line` is zero-based and points at the task's own note line.
//! - `Timestamp::start_minutes` is always below one day (`1440`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Minutes in one calendar day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$").expect("valid clock regex"));

/// Stable identifier for a planner task.
pub type TaskId = Uuid;

/// Where the task's textual representation lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskLocation {
    /// Vault-relative note path, slash separated.
    pub path: String,
    /// Zero-based line index inside the note.
    pub line: usize,
}

impl TaskLocation {
    pub fn new(path: impl Into<String>, line: usize) -> Self {
        Self {
            path: path.into(),
            line,
        }
    }
}

/// Start time plus duration for one task.
///
/// Values are wall-clock minutes; the end may run past midnight and is then
/// rendered modulo one day. Deserialization runs `validate()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimestamp")]
pub struct Timestamp {
    /// Minutes since local midnight.
    pub start_minutes: u32,
    /// Length of the slot in minutes.
    pub duration_minutes: u32,
}

/// Unvalidated wire shape of `Timestamp`.
#[derive(Deserialize)]
struct RawTimestamp {
    start_minutes: u32,
    duration_minutes: u32,
}

impl TryFrom<RawTimestamp> for Timestamp {
    type Error = TimestampValidationError;

    fn try_from(raw: RawTimestamp) -> Result<Self, Self::Error> {
        Self::new(raw.start_minutes, raw.duration_minutes)
    }
}

/// Validation errors for timestamp values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampValidationError {
    /// `start_minutes` is outside of one day.
    StartOutOfDay(u32),
    /// A clock string could not be parsed as `HH:MM`.
    InvalidClock(String),
}

impl Display for TimestampValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StartOutOfDay(value) => write!(
                f,
                "start_minutes must be below {MINUTES_PER_DAY}, got {value}"
            ),
            Self::InvalidClock(value) => write!(f, "invalid clock value `{value}`; expected HH:MM"),
        }
    }
}

impl Error for TimestampValidationError {}

impl Timestamp {
    /// Builds a validated timestamp.
    pub fn new(start_minutes: u32, duration_minutes: u32) -> Result<Self, TimestampValidationError> {
        let timestamp = Self {
            start_minutes,
            duration_minutes,
        };
        timestamp.validate()?;
        Ok(timestamp)
    }

    /// Builds a timestamp from an `HH:MM` start and a duration.
    pub fn from_clock(
        start: &str,
        duration_minutes: u32,
    ) -> Result<Self, TimestampValidationError> {
        Self::new(Self::parse_clock(start)?, duration_minutes)
    }

    /// Parses `HH:MM` (24h) into minutes since midnight.
    pub fn parse_clock(value: &str) -> Result<u32, TimestampValidationError> {
        let invalid = || TimestampValidationError::InvalidClock(value.to_string());
        let caps = CLOCK_RE.captures(value).ok_or_else(invalid)?;
        let hours: u32 = caps[1].parse().map_err(|_| invalid())?;
        let minutes: u32 = caps[2].parse().map_err(|_| invalid())?;
        if hours >= 24 || minutes >= 60 {
            return Err(invalid());
        }
        Ok(hours * 60 + minutes)
    }

    /// Checks value invariants.
    pub fn validate(&self) -> Result<(), TimestampValidationError> {
        if self.start_minutes >= MINUTES_PER_DAY {
            return Err(TimestampValidationError::StartOutOfDay(self.start_minutes));
        }
        Ok(())
    }

    /// Absolute end in minutes since the start day's midnight.
    pub fn end_minutes(&self) -> u32 {
        self.start_minutes.saturating_add(self.duration_minutes)
    }
}

/// One planner entry indexed from a note line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub location: TaskLocation,
    /// Line prefix before the time range, e.g. `"- [ ] "`.
    pub list_tokens: String,
    /// First-line text after the time range.
    pub text: String,
    pub timestamp: Timestamp,
}

impl Task {
    /// Creates a task with a generated stable ID.
    pub fn new(
        location: TaskLocation,
        list_tokens: impl Into<String>,
        text: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self::with_id(Uuid::new_v4(), location, list_tokens, text, timestamp)
    }

    /// Creates a task with a caller-provided ID.
    pub fn with_id(
        id: TaskId,
        location: TaskLocation,
        list_tokens: impl Into<String>,
        text: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            id,
            location,
            list_tokens: list_tokens.into(),
            text: text.into(),
            timestamp,
        }
    }

    /// Returns a copy carrying `timestamp`; every other field is kept.
    pub fn with_timestamp(&self, timestamp: Timestamp) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }
}
