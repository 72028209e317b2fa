//! `dayplan` command line entry point.
//!
//! # Responsibility
//! - Reschedule one task line in a note through the core timestamp service.
//! - Print the core version for quick linkage checks.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dayplan_core::{
    core_version, init_logging_from_config, open_vault_service, InMemoryTaskStore, LineSerializer,
    PlannerConfig, Task, TaskLocation, Timestamp, TimestampUpdateOutcome,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dayplan", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the core library version
    Version,
    /// Move a task line to a new time slot
    Reschedule {
        /// Vault root directory
        #[arg(long, value_name = "DIR")]
        vault: PathBuf,
        /// Note path relative to the vault root
        #[arg(long, value_name = "PATH")]
        note: String,
        /// Zero-based line of the task inside the note
        #[arg(long)]
        line: usize,
        /// New start time (HH:MM)
        #[arg(long, value_name = "HH:MM")]
        start: String,
        /// New duration in minutes
        #[arg(long, value_name = "MINUTES")]
        duration: u32,
        /// Task text following the time range
        #[arg(long)]
        text: String,
        /// Line prefix before the time range
        #[arg(long, default_value = "- [ ] ")]
        list_tokens: String,
        /// JSON config file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Absolute directory for log files (overrides config)
        #[arg(long, value_name = "DIR")]
        log_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("dayplan_core version={}", core_version());
        }
        Commands::Reschedule {
            vault,
            note,
            line,
            start,
            duration,
            text,
            list_tokens,
            config,
            log_dir,
        } => {
            let mut config = match config {
                Some(path) => PlannerConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => PlannerConfig::default(),
            };
            if log_dir.is_some() {
                config.log_dir = log_dir;
            }
            init_logging_from_config(&config).context("starting logging")?;

            let timestamp = Timestamp::from_clock(&start, duration)?;
            // The indexed record only needs a valid location; its old slot is
            // replaced wholesale.
            let task = Task::new(TaskLocation::new(note, line), list_tokens, text, timestamp);
            let id = task.id;
            let store = InMemoryTaskStore::new(vec![task]);
            let service = open_vault_service(store, vault, &config);

            match service.update_timestamps(id, timestamp)? {
                TimestampUpdateOutcome::Updated(updated) => {
                    let line = service
                        .rewriter()
                        .serializer()
                        .render(&updated, &updated.timestamp);
                    println!("{line}");
                }
                TimestampUpdateOutcome::Unchanged => bail!("task {id} was not found"),
            }
        }
    }

    Ok(())
}
