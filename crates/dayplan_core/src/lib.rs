//! Core domain logic for dayplan.
//! Keeps planner tasks and their daily note lines in step.

pub mod config;
pub mod format;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;
pub mod vault;

pub use config::{ConfigError, PlannerConfig};
pub use format::line_format::{format_clock, DayPlannerLineFormat, LineSerializer};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::task::{Task, TaskId, TaskLocation, Timestamp, TimestampValidationError};
pub use service::note_rewriter::{replace_line, FileWriteLocks, NoteRewriter, RewriteError};
pub use service::timestamp_service::{
    apply_timestamp, plan_timestamp_update, TimestampService, TimestampUpdateError,
    TimestampUpdateOutcome, TimestampUpdatePlan,
};
pub use store::task_store::{InMemoryTaskStore, TaskSnapshot, TaskStore};
pub use vault::file_store::{FileHandle, FileStore, FsVault, ResolutionError};

/// Builds a timestamp service over a directory vault using `config`.
pub fn open_vault_service<S: TaskStore>(
    store: S,
    vault_root: impl Into<std::path::PathBuf>,
    config: &PlannerConfig,
) -> TimestampService<S, FsVault, DayPlannerLineFormat> {
    let vault = FsVault::new(vault_root);
    let rewriter = if config.serialize_file_writes {
        NoteRewriter::new(vault, config.line_format())
    } else {
        NoteRewriter::unserialized(vault, config.line_format())
    };
    TimestampService::new(store, rewriter)
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
