//! Shared task collection contract and in-memory implementation.
//!
//! # Responsibility
//! - Hold the ordered task collection as an immutable published snapshot.
//! - Apply replacement functions atomically against the current snapshot.
//!
//! # Invariants
//! - A published snapshot is never mutated; updates publish a new `Vec`.
//! - `update` runs its function under the write lock, so two updates never
//!   start from the same snapshot.

use crate::model::task::{Task, TaskId};
use parking_lot::RwLock;
use std::sync::Arc;

/// Snapshot handle handed to readers.
pub type TaskSnapshot = Arc<Vec<Task>>;

/// Shared task collection seam.
pub trait TaskStore {
    /// Returns the currently published collection.
    fn snapshot(&self) -> TaskSnapshot;
    /// Builds the next collection from the current one and publishes it.
    fn update(&self, f: &mut dyn FnMut(&[Task]) -> Vec<Task>);
}

impl<S: TaskStore + ?Sized> TaskStore for Arc<S> {
    fn snapshot(&self) -> TaskSnapshot {
        (**self).snapshot()
    }

    fn update(&self, f: &mut dyn FnMut(&[Task]) -> Vec<Task>) {
        (**self).update(f)
    }
}

/// Process-local copy-on-write task store.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    current: RwLock<TaskSnapshot>,
}

impl InMemoryTaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            current: RwLock::new(Arc::new(tasks)),
        }
    }

    /// Publishes `tasks` wholesale, dropping the previous collection.
    pub fn replace_all(&self, tasks: Vec<Task>) {
        *self.current.write() = Arc::new(tasks);
    }

    /// Looks up one task in the current snapshot.
    pub fn get(&self, id: TaskId) -> Option<Task> {
        self.current
            .read()
            .iter()
            .find(|task| task.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn snapshot(&self) -> TaskSnapshot {
        Arc::clone(&self.current.read())
    }

    fn update(&self, f: &mut dyn FnMut(&[Task]) -> Vec<Task>) {
        let mut guard = self.current.write();
        let next = f(guard.as_slice());
        *guard = Arc::new(next);
    }
}
