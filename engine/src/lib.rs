//! # PhotoArc Engine - Archive Reclamation Library
//!
//! Core library for reclaiming primary storage from an aged photo archive.
//! Qualifying directories are verified against their backup mirror and then
//! replaced by a symbolic link to that mirror; very old year directories are
//! first staged into a secondary "evacuation" store.
//!
//! ## Overview
//!
//! The engine provides:
//! - Date-based eligibility filters over `root/<year>/<day>` names
//! - Cheap recursive backup verification (name + size, no content read)
//! - Recursive mirroring for staging the evacuation store
//! - The move-aside / symlink / cleanup replace protocol with rollback
//! - Two batch workflows composing the above, driven by a `RunContext`
//!
//! ## Basic Usage
//!
//! ```no_run
//! use chrono::Local;
//! use engine::{config, FileLog, RunContext, RunKind};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = config::load(&config::default_path())?;
//! let today = Local::now().date_naive();
//! let log_dir = settings.log_dir.clone().ok_or("LogDirectory not set")?;
//! let log = FileLog::open(&log_dir, today)?;
//!
//! let ctx = RunContext::new(&settings, &log, today);
//! let summary = engine::workflow::run(&ctx, RunKind::Archive)?;
//! println!("replaced {} directories", summary.replaced);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - **model**: Core data structures (DirectoryEntry, Configuration, ...)
//! - **error**: Error types and handling
//! - **config**: Flat key/value settings loading
//! - **logging**: Leveled log sink (daily file, memory sink for tests)
//! - **fs_ops**: Low-level filesystem operations
//! - **eligibility**: Date-based filters
//! - **verify**: Backup verification
//! - **replace**: The directory replace protocol
//! - **workflow**: Run orchestration (archive, evacuation)
//! - **process**: Synchronous helper-process execution

pub mod config;
pub mod eligibility;
pub mod error;
pub mod fs_ops;
pub mod logging;
pub mod model;
pub mod process;
pub mod replace;
pub mod verify;
pub mod workflow;

// Re-export main types and functions
pub use eligibility::{archive_eligibility, evacuation_eligibility, Eligibility};
pub use error::ArchiveError;
pub use logging::{FileLog, LogLevel, LogSink, MemoryLog};
pub use model::{
    Configuration, DirectoryEntry, EligibilityDate, EntryKind, MountSettings, ReplaceOperation,
    RunSummary,
};
pub use replace::replace_with_symlink;
pub use verify::verify_backup;
pub use workflow::{run_archive, run_evacuation, RunContext, RunKind};
