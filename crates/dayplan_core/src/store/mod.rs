//! Shared in-memory state.
//!
//! # Responsibility
//! - Define the task collection seam services read from and publish to.
//! - Keep process-wide state behind an injected handle instead of a global.

pub mod task_store;
