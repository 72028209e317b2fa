//! Note line rewrite use-case.
//!
//! # Responsibility
//! - Mirror a task's new timestamp into its backing note line.
//! - Serialize read-modify-write cycles that target the same note.
//!
//! # Invariants
//! - Exactly one line changes; all other lines are kept byte-for-byte.
//! - Nothing is written when resolution, reading, or the line lookup fails.
//! - Lines are split and re-joined on `'\n'` only.

use crate::format::line_format::LineSerializer;
use crate::model::task::{Task, Timestamp};
use crate::vault::file_store::{FileHandle, FileStore, ResolutionError};
use log::{error, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::sync::Arc;
use std::time::Instant;

/// Failures while rewriting one note line.
#[derive(Debug)]
pub enum RewriteError {
    /// Task path does not resolve to a regular file.
    Resolution(ResolutionError),
    /// Read or write failed in the file store.
    Io(io::Error),
    /// Recorded line is past the end of the current note.
    OutOfRange { line: usize, line_count: usize },
}

impl Display for RewriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolution(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "note i/o failed: {err}"),
            Self::OutOfRange { line, line_count } => write!(
                f,
                "line {line} is out of range for note with {line_count} lines"
            ),
        }
    }
}

impl Error for RewriteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Resolution(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::OutOfRange { .. } => None,
        }
    }
}

impl From<ResolutionError> for RewriteError {
    fn from(value: ResolutionError) -> Self {
        Self::Resolution(value)
    }
}

impl From<io::Error> for RewriteError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl RewriteError {
    fn code(&self) -> &'static str {
        match self {
            Self::Resolution(_) => "resolution_failed",
            Self::Io(_) => "io_failed",
            Self::OutOfRange { .. } => "line_out_of_range",
        }
    }
}

/// Per-note mutexes keyed by resolved file location.
#[derive(Debug, Default)]
pub struct FileWriteLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileWriteLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock guarding `key`, creating it on first use.
    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    /// Runs `f` while holding the lock for `key`.
    ///
    /// The entry is dropped from the map once no other caller holds or waits
    /// on it, so the map only tracks notes with rewrites in flight.
    pub fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(key);
        let result = {
            let _guard = lock.lock();
            f()
        };

        let mut locks = self.locks.lock();
        // One reference in the map plus ours: nobody else is queued.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(key);
        }
        result
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

/// Rewrites task lines in notes held by a file store.
pub struct NoteRewriter<F: FileStore, L: LineSerializer> {
    files: F,
    serializer: L,
    write_locks: Option<FileWriteLocks>,
}

impl<F: FileStore, L: LineSerializer> NoteRewriter<F, L> {
    /// Creates a rewriter that serializes writes per note.
    pub fn new(files: F, serializer: L) -> Self {
        Self {
            files,
            serializer,
            write_locks: Some(FileWriteLocks::new()),
        }
    }

    /// Creates a rewriter with no per-note serialization.
    ///
    /// Concurrent rewrites of the same note may then lose each other's line.
    pub fn unserialized(files: F, serializer: L) -> Self {
        Self {
            files,
            serializer,
            write_locks: None,
        }
    }

    pub fn files(&self) -> &F {
        &self.files
    }

    pub fn serializer(&self) -> &L {
        &self.serializer
    }

    /// Per-note locks, `None` for an unserialized rewriter.
    pub fn write_locks(&self) -> Option<&FileWriteLocks> {
        self.write_locks.as_ref()
    }

    /// Replaces `task`'s note line with its rendering for `timestamp`.
    ///
    /// `task` is the record as indexed (its location must still be valid).
    ///
    /// # Errors
    /// - `Resolution` when the path is missing, invalid, or not a file.
    /// - `OutOfRange` when the recorded line no longer exists.
    /// - `Io` for read/write failures, returned unchanged and never retried.
    pub fn rewrite_task_line(&self, task: &Task, timestamp: &Timestamp) -> Result<(), RewriteError> {
        let started_at = Instant::now();
        let result = self.rewrite_inner(task, timestamp);
        match &result {
            Ok(bytes) => info!(
                "event=note_line_rewrite module=service status=ok task_id={} path={} line={} bytes={} duration_ms={}",
                task.id,
                task.location.path,
                task.location.line,
                bytes,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=note_line_rewrite module=service status=error task_id={} path={} line={} duration_ms={} error_code={} error={}",
                task.id,
                task.location.path,
                task.location.line,
                started_at.elapsed().as_millis(),
                err.code(),
                err
            ),
        }
        result.map(|_| ())
    }

    fn rewrite_inner(&self, task: &Task, timestamp: &Timestamp) -> Result<usize, RewriteError> {
        let file = self.files.resolve(&task.location.path)?;

        match self.write_locks.as_ref() {
            // Keyed on the resolved location so symlinked aliases share a lock.
            Some(locks) => locks.with_lock(&file.location.to_string_lossy(), || {
                self.replace_in_file(&file, task, timestamp)
            }),
            None => self.replace_in_file(&file, task, timestamp),
        }
    }

    fn replace_in_file(
        &self,
        file: &FileHandle,
        task: &Task,
        timestamp: &Timestamp,
    ) -> Result<usize, RewriteError> {
        let contents = self.files.read_text(file)?;
        let replacement = self.serializer.render(task, timestamp);
        let updated = replace_line(&contents, task.location.line, &replacement)?;
        self.files.write_text(file, &updated)?;
        Ok(updated.len())
    }
}

/// Replaces line `line` of `contents` with `replacement`.
///
/// A trailing newline yields a final empty line, which is addressable like
/// any other.
pub fn replace_line(contents: &str, line: usize, replacement: &str) -> Result<String, RewriteError> {
    let mut lines: Vec<&str> = contents.split('\n').collect();
    let line_count = lines.len();
    let slot = lines
        .get_mut(line)
        .ok_or(RewriteError::OutOfRange { line, line_count })?;
    *slot = replacement;
    Ok(lines.join("\n"))
}
