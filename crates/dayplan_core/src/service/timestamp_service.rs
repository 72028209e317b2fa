//! Task timestamp update use-case.
//!
//! # Responsibility
//! - Replace one task's timestamp in the shared task collection.
//! - Mirror the change into the task's note line before publishing it.
//!
//! # Invariants
//! - Unknown ids change nothing and touch no files.
//! - The note is written first; the collection is published only on success.
//! - Collection order and length never change; other entries stay equal.
//! - Publishing re-applies the change to the store's current snapshot.

use crate::format::line_format::LineSerializer;
use crate::model::task::{Task, TaskId, Timestamp, TimestampValidationError};
use crate::service::note_rewriter::{NoteRewriter, RewriteError};
use crate::store::task_store::TaskStore;
use crate::vault::file_store::FileStore;
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Failures from timestamp updates.
#[derive(Debug)]
pub enum TimestampUpdateError {
    /// Timestamp value failed validation; nothing was touched.
    InvalidTimestamp(TimestampValidationError),
    /// Note rewrite failed; the in-memory collection was left unchanged.
    Rewrite {
        task_id: TaskId,
        source: RewriteError,
    },
}

impl Display for TimestampUpdateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimestamp(err) => write!(f, "{err}"),
            Self::Rewrite { task_id, source } => {
                write!(f, "failed to update note line for task {task_id}: {source}")
            }
        }
    }
}

impl Error for TimestampUpdateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTimestamp(err) => Some(err),
            Self::Rewrite { source, .. } => Some(source),
        }
    }
}

impl From<TimestampValidationError> for TimestampUpdateError {
    fn from(value: TimestampValidationError) -> Self {
        Self::InvalidTimestamp(value)
    }
}

/// Result of a timestamp update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampUpdateOutcome {
    /// No task carried the id.
    Unchanged,
    /// Note and collection were both updated; carries the published task.
    Updated(Task),
}

/// Matching task before and after an update, found in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampUpdatePlan {
    /// Matching task as it was before the update.
    pub original: Task,
    /// Matching task with the new timestamp.
    pub updated: Task,
}

impl TimestampUpdatePlan {
    /// Builds the replacement collection for `tasks`, same order and length.
    ///
    /// `tasks` may be newer than the snapshot the plan came from; only the
    /// planned task's timestamp is replaced.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        apply_timestamp(tasks, self.updated.id, self.updated.timestamp)
    }
}

/// Finds task `id` and computes its updated record, without side effects.
///
/// Returns `None` when no task carries `id`.
pub fn plan_timestamp_update(
    tasks: &[Task],
    id: TaskId,
    timestamp: Timestamp,
) -> Option<TimestampUpdatePlan> {
    let original = tasks.iter().find(|task| task.id == id)?.clone();
    let updated = original.with_timestamp(timestamp);
    Some(TimestampUpdatePlan { original, updated })
}

/// Maps `tasks`, replacing the timestamp of every entry with `id`.
pub fn apply_timestamp(tasks: &[Task], id: TaskId, timestamp: Timestamp) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if task.id == id {
                task.with_timestamp(timestamp)
            } else {
                task.clone()
            }
        })
        .collect()
}

/// Timestamp service over injected task store and note rewriter.
pub struct TimestampService<S: TaskStore, F: FileStore, L: LineSerializer> {
    store: S,
    rewriter: NoteRewriter<F, L>,
}

impl<S: TaskStore, F: FileStore, L: LineSerializer> TimestampService<S, F, L> {
    pub fn new(store: S, rewriter: NoteRewriter<F, L>) -> Self {
        Self { store, rewriter }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rewriter(&self) -> &NoteRewriter<F, L> {
        &self.rewriter
    }

    /// Moves task `id` to `timestamp` in its note and in the collection.
    ///
    /// # Contract
    /// - Unknown `id`: returns `Unchanged`; no file read or write happens.
    /// - Known `id`: rewrites the note line from the pre-update record, then
    ///   publishes the collection with only that task's timestamp replaced.
    ///
    /// # Errors
    /// - `InvalidTimestamp` before any I/O.
    /// - `Rewrite` when the note could not be updated; memory is not changed.
    pub fn update_timestamps(
        &self,
        id: TaskId,
        timestamp: Timestamp,
    ) -> Result<TimestampUpdateOutcome, TimestampUpdateError> {
        timestamp.validate()?;

        let snapshot = self.store.snapshot();
        let Some(plan) = plan_timestamp_update(snapshot.as_slice(), id, timestamp) else {
            debug!(
                "event=task_timestamp_update module=service status=skip task_id={} reason=not_found",
                id
            );
            return Ok(TimestampUpdateOutcome::Unchanged);
        };

        if let Err(source) = self.rewriter.rewrite_task_line(&plan.original, &timestamp) {
            error!(
                "event=task_timestamp_update module=service status=error task_id={} error_code=rewrite_failed",
                id
            );
            return Err(TimestampUpdateError::Rewrite {
                task_id: id,
                source,
            });
        }

        self.store.update(&mut |current| plan.apply(current));

        info!(
            "event=task_timestamp_update module=service status=ok task_id={} start_minutes={} duration_minutes={}",
            id, timestamp.start_minutes, timestamp.duration_minutes
        );
        Ok(TimestampUpdateOutcome::Updated(plan.updated))
    }
}
