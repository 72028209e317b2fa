//! Note file access.
//!
//! # Responsibility
//! - Define the host file store seam used by note rewrites.
//! - Provide a local directory vault implementation.

pub mod file_store;
