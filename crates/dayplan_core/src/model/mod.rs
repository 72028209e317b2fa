//! Planner domain model.
//!
//! # Responsibility
//! - Define the task and timestamp records shared by stores and services.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Updates replace whole values; nothing is mutated in place once published.

pub mod task;
