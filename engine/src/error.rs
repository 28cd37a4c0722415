//! Error types for the archive engine.
//!
//! The primary error type is `ArchiveError`, which represents run-level
//! failures that abort the batch. Skip-and-continue outcomes (a directory
//! name that doesn't look like a date, a missing backup entry) are NOT
//! errors; they are ordinary return values of the filter and the verifier.

use std::error::Error;
use std::fmt::{self, Display};
use std::io;
use std::path::PathBuf;

/// Run-aborting failures.
///
/// Every variant here unwinds the run to the top of the process; the
/// replace-protocol variants additionally describe what state was left
/// on disk.
#[derive(Debug)]
pub enum ArchiveError {
    /// Settings file could not be read
    ConfigRead { path: PathBuf, source: io::Error },

    /// A key required by the selected workflow is missing
    ConfigKey { key: &'static str },

    /// A key is present but its value does not parse
    ConfigValue { key: &'static str, value: String },

    /// A configured directory is missing or not writable
    ConfigDir { role: &'static str, path: PathBuf },

    /// Log file could not be opened
    LogOpen { path: PathBuf, source: io::Error },

    /// A directory name matched the date shape but the date is invalid
    DateParse { year: String, day: String, reason: String },

    /// Failed to list a directory
    ListDir { path: PathBuf, source: io::Error },

    /// Failed to rename a path (move-aside step of the replace protocol)
    RenameFailed { from: PathBuf, to: PathBuf, source: io::Error },

    /// Symlink creation failed; the original directory was restored
    SymlinkFailed { target: PathBuf, backup: PathBuf, source: io::Error },

    /// Symlink creation failed AND restoring the original also failed;
    /// the directory content sits at the temporary path
    RollbackFailed { target: PathBuf, temp: PathBuf, source: io::Error },

    /// The symlink is installed but the moved-aside directory could not be
    /// deleted; the temporary path is orphaned on disk
    CleanupFailed { temp: PathBuf, source: Box<ArchiveError> },

    /// Failed to copy a file while staging the evacuation mirror
    CopyFailed { from: PathBuf, to: PathBuf, source: io::Error },

    /// Failed to create a directory
    CreateDir { path: PathBuf, source: io::Error },

    /// Failed to delete a file or directory
    RemoveFailed { path: PathBuf, source: io::Error },

    /// A helper process could not be launched
    ProcessFailed { command: String, source: io::Error },
}

impl Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigRead { path, source } => {
                write!(f, "Cannot read settings file {}: {}", path.display(), source)
            }
            Self::ConfigKey { key } => {
                write!(f, "Missing configuration key: {}", key)
            }
            Self::ConfigValue { key, value } => {
                write!(f, "Invalid value for configuration key {}: '{}'", key, value)
            }
            Self::ConfigDir { role, path } => {
                write!(
                    f,
                    "Configured {} directory is missing or not writable: {}",
                    role,
                    path.display()
                )
            }
            Self::LogOpen { path, source } => {
                write!(f, "Cannot open log file {}: {}", path.display(), source)
            }
            Self::DateParse { year, day, reason } => {
                write!(f, "Invalid date in directory names {}/{}: {}", year, day, reason)
            }
            Self::ListDir { path, .. } => {
                write!(f, "Failed to list directory: {}", path.display())
            }
            Self::RenameFailed { from, to, .. } => {
                write!(f, "Failed to move {} to {}", from.display(), to.display())
            }
            Self::SymlinkFailed { target, backup, source } => {
                write!(
                    f,
                    "Failed to create symlink {} -> {} ({}); original directory restored",
                    target.display(),
                    backup.display(),
                    source
                )
            }
            Self::RollbackFailed { target, temp, source } => {
                write!(
                    f,
                    "Failed to restore {} after symlink failure ({}); content left at {}",
                    target.display(),
                    source,
                    temp.display()
                )
            }
            Self::CleanupFailed { temp, source } => {
                write!(
                    f,
                    "Symlink installed but temporary directory left behind at {}: {}",
                    temp.display(),
                    source
                )
            }
            Self::CopyFailed { from, to, .. } => {
                write!(f, "Failed to copy {} to {}", from.display(), to.display())
            }
            Self::CreateDir { path, .. } => {
                write!(f, "Failed to create directory: {}", path.display())
            }
            Self::RemoveFailed { path, .. } => {
                write!(f, "Failed to delete: {}", path.display())
            }
            Self::ProcessFailed { command, source } => {
                write!(f, "Failed to run helper process '{}': {}", command, source)
            }
        }
    }
}

impl Error for ArchiveError {}
