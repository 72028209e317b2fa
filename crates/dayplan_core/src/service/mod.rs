//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate task store, file store, and line format into use-case APIs.
//! - Keep callers decoupled from storage details.

pub mod note_rewriter;
pub mod timestamp_service;
