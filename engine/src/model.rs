//! Core data model for archive and evacuation runs.
//!
//! This module defines the main data structures shared by the workflows:
//! - DirectoryEntry: a single listing entry with name, kind and size
//! - EligibilityDate: a calendar date recovered from directory names
//! - Configuration: the immutable per-run settings
//! - ReplaceOperation: the transient record driving the replace protocol
//! - RunSummary: per-run counters returned by the orchestrators

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

/// What kind of filesystem object a directory entry is.
///
/// Symbolic links are reported as `Symlink` regardless of what they point
/// at; the verifier and the walkers treat them as leaves, never recursing
/// through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory (not a symlink to one)
    Dir,
    /// Symbolic link
    Symlink,
}

/// A single entry produced by listing a directory.
///
/// Never persisted; entries live only for the duration of a walk.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Full path of the entry
    pub path: PathBuf,

    /// File name component, lossily converted to UTF-8
    pub name: String,

    /// Entry kind (file, directory, symlink)
    pub kind: EntryKind,

    /// Size in bytes; 0 for directories
    pub size: u64,
}

impl DirectoryEntry {
    /// True for directories that are not symbolic links.
    pub fn is_plain_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A (year, month, day) triple parsed from a year-directory name and a
/// day-directory name.
///
/// Two day-name shapes are accepted: pure digits `MMDD` (first two digits
/// are the month, the remainder the day) and digits separated by a run of
/// non-digit characters (`month`, `day`, trailing text ignored). A name
/// failing the shape is not an EligibilityDate at all; the caller skips it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl EligibilityDate {
    /// Resolve to a calendar date, or None when the triple is out of range
    /// (month 13, day 32, ...).
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }
}

/// Credentials for mounting the network drive before a run.
///
/// Present only when `MountTarget` is configured; the password never
/// appears in CONFIGLIST output.
#[derive(Debug, Clone, Serialize)]
pub struct MountSettings {
    pub target: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
}

/// Immutable per-run configuration, read once at startup.
///
/// Every field except the mount settings maps to one key of the flat
/// key/value settings file. Fields are optional at load time; each
/// workflow demands the keys it needs and fails the run when one is
/// missing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Configuration {
    /// `RootDirectory` - the photo archive being reclaimed
    pub root_dir: Option<PathBuf>,

    /// `BackupDirectory` - the primary backup mirror
    pub backup_dir: Option<PathBuf>,

    /// `EvacuationDirectory` - the secondary store for very old years
    pub evacuation_dir: Option<PathBuf>,

    /// `LogDirectory` - where daily log files are written
    pub log_dir: Option<PathBuf>,

    /// `ArchiveMonth` - age threshold for the archive workflow, in months
    pub archive_months: Option<u32>,

    /// `EvacuationYear` - year threshold for the evacuation workflow
    pub evacuation_year: Option<i32>,

    /// Optional network-mount settings (`MountTarget` / `MountUser` /
    /// `MountPassword`)
    pub mount: Option<MountSettings>,
}

/// Transient record of one replace operation.
///
/// Only used inside the replace protocol to name the three paths involved
/// and to decide rollback; never persisted.
#[derive(Debug, Clone)]
pub struct ReplaceOperation {
    /// The directory being converted into a symlink
    pub target: PathBuf,

    /// Where the new symlink will point
    pub link_target: PathBuf,

    /// Temporary sibling the target is moved to during the swap
    pub temp: PathBuf,
}

impl ReplaceOperation {
    /// Build the operation record for a target/backup pair. The temporary
    /// path is the target with a `-bk` suffix, a sibling on the same
    /// filesystem so the move stays a rename.
    pub fn new(target: &Path, link_target: &Path) -> Self {
        let mut temp = target.as_os_str().to_os_string();
        temp.push("-bk");
        ReplaceOperation {
            target: target.to_path_buf(),
            link_target: link_target.to_path_buf(),
            temp: PathBuf::from(temp),
        }
    }
}

/// Counters accumulated over one workflow run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Directories replaced by a symlink
    pub replaced: usize,

    /// Directories skipped by the eligibility filter (shape mismatch or
    /// not old enough)
    pub skipped: usize,

    /// Directories left untouched because verification found a missing
    /// backup entry
    pub misses: usize,
}
