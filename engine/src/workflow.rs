//! Workflow orchestration.
//!
//! The two batch workflows share one shape: pre-flight the configured
//! directories, bracket the run with log markers, walk the photo root,
//! filter by age, verify the backup, replace with a symlink. They differ
//! in granularity (per-day vs per-year) and in that evacuation stages its
//! own mirror first.
//!
//! Everything a run needs travels in an explicitly constructed
//! `RunContext`; there is no global configuration or logger state.

use std::fmt;
use std::path::Path;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::eligibility::{self, Eligibility};
use crate::error::ArchiveError;
use crate::fs_ops;
use crate::logging::LogSink;
use crate::model::{Configuration, RunSummary};
use crate::process;
use crate::replace::replace_with_symlink;
use crate::verify::verify_backup;

/// Which workflow a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Archive,
    Evacuation,
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunKind::Archive => write!(f, "ARCHIVE"),
            RunKind::Evacuation => write!(f, "EVACUATION"),
        }
    }
}

/// Everything one run needs, built once at startup and passed by
/// reference into every component.
pub struct RunContext<'a> {
    pub config: &'a Configuration,
    pub log: &'a dyn LogSink,
    /// The run date all eligibility decisions are made against.
    pub today: NaiveDate,
    /// Identifier tying the start/end log markers of one run together.
    pub run_id: Uuid,
}

impl<'a> RunContext<'a> {
    pub fn new(config: &'a Configuration, log: &'a dyn LogSink, today: NaiveDate) -> Self {
        RunContext {
            config,
            log,
            today,
            run_id: Uuid::new_v4(),
        }
    }
}

/// Execute the workflow selected by `kind`.
pub fn run(ctx: &RunContext, kind: RunKind) -> Result<RunSummary, ArchiveError> {
    match kind {
        RunKind::Archive => run_archive(ctx),
        RunKind::Evacuation => run_evacuation(ctx),
    }
}

fn require_path<'a>(
    value: &'a Option<std::path::PathBuf>,
    key: &'static str,
) -> Result<&'a Path, ArchiveError> {
    value.as_deref().ok_or(ArchiveError::ConfigKey { key })
}

fn check_dir(role: &'static str, path: &Path) -> Result<(), ArchiveError> {
    if fs_ops::dir_writable(path) {
        Ok(())
    } else {
        Err(ArchiveError::ConfigDir {
            role,
            path: path.to_path_buf(),
        })
    }
}

/// Mount the network share when the settings ask for one, logging the
/// captured command output.
fn mount_if_configured(ctx: &RunContext) -> Result<(), ArchiveError> {
    if let Some(mount) = &ctx.config.mount {
        let output = process::mount_share(mount)?;
        let output = output.trim();
        if output.is_empty() {
            ctx.log.info(&format!("mounted {}", mount.target));
        } else {
            ctx.log.info(&format!("mounted {}: {}", mount.target, output));
        }
    }
    Ok(())
}

/// Run the archive workflow: every day directory older than the month
/// threshold and fully mirrored in the backup is replaced by a symlink to
/// that backup copy.
///
/// # Errors
/// The first fatal failure (configuration, date parse, replace protocol,
/// I/O) aborts the whole run. Shape mismatches and verification misses
/// only skip the affected directory.
pub fn run_archive(ctx: &RunContext) -> Result<RunSummary, ArchiveError> {
    let config = ctx.config;
    mount_if_configured(ctx)?;

    let root = require_path(&config.root_dir, "RootDirectory")?;
    let backup = require_path(&config.backup_dir, "BackupDirectory")?;
    let months = config
        .archive_months
        .ok_or(ArchiveError::ConfigKey { key: "ArchiveMonth" })?;
    check_dir("root", root)?;
    check_dir("backup", backup)?;

    ctx.log.info(&format!(
        "==== {} run {} started ====",
        RunKind::Archive,
        ctx.run_id
    ));
    let mut summary = RunSummary::default();

    for year in fs_ops::list_dir(root)? {
        if !year.is_plain_dir() || !eligibility::is_all_digits(&year.name) {
            continue;
        }
        for day in fs_ops::list_dir(&year.path)? {
            if !day.is_plain_dir() {
                continue;
            }
            match eligibility::archive_eligibility(&year.name, &day.name, ctx.today, months)? {
                Eligibility::Eligible => {}
                Eligibility::NotEligible | Eligibility::Skipped => {
                    summary.skipped += 1;
                    continue;
                }
            }
            // Backups are laid out flat by day-directory name.
            let backup_path = backup.join(&day.name);
            if verify_backup(&day.path, &backup_path, ctx.log)? {
                replace_with_symlink(&day.path, &backup_path, ctx.log)?;
                summary.replaced += 1;
            } else {
                summary.misses += 1;
            }
        }
    }

    ctx.log.info(&format!(
        "==== {} run {} finished: replaced={} skipped={} misses={} ====",
        RunKind::Archive,
        ctx.run_id,
        summary.replaced,
        summary.skipped,
        summary.misses
    ));
    Ok(summary)
}

/// Run the evacuation workflow: every year directory at or below the year
/// threshold is staged into the evacuation store (when not already
/// there), verified against the backup, and replaced by a symlink to the
/// evacuation copy.
///
/// # Errors
/// Same abort policy as `run_archive`.
pub fn run_evacuation(ctx: &RunContext) -> Result<RunSummary, ArchiveError> {
    let config = ctx.config;
    mount_if_configured(ctx)?;

    let root = require_path(&config.root_dir, "RootDirectory")?;
    let backup = require_path(&config.backup_dir, "BackupDirectory")?;
    let evacuation = require_path(&config.evacuation_dir, "EvacuationDirectory")?;
    let threshold_year = config
        .evacuation_year
        .ok_or(ArchiveError::ConfigKey { key: "EvacuationYear" })?;
    check_dir("root", root)?;
    check_dir("backup", backup)?;
    check_dir("evacuation", evacuation)?;

    ctx.log.info(&format!(
        "==== {} run {} started ====",
        RunKind::Evacuation,
        ctx.run_id
    ));
    let mut summary = RunSummary::default();

    for year in fs_ops::list_dir(root)? {
        if !year.is_plain_dir() {
            continue;
        }
        match eligibility::evacuation_eligibility(&year.name, threshold_year) {
            Eligibility::Eligible => {}
            Eligibility::NotEligible | Eligibility::Skipped => {
                summary.skipped += 1;
                continue;
            }
        }

        let backup_path = backup.join(&year.name);
        let evacuation_path = evacuation.join(&year.name);
        if !evacuation_path.exists() {
            fs_ops::mirror_tree(&backup_path, &evacuation_path)?;
            ctx.log.info(&format!(
                "staged copy: {} -> {}",
                backup_path.display(),
                evacuation_path.display()
            ));
        }

        // The verified pair is backup vs evacuation; the root directory
        // is only touched once its replacement target is proven complete.
        if verify_backup(&backup_path, &evacuation_path, ctx.log)? {
            replace_with_symlink(&year.path, &evacuation_path, ctx.log)?;
            summary.replaced += 1;
        } else {
            summary.misses += 1;
        }
    }

    ctx.log.info(&format!(
        "==== {} run {} finished: replaced={} skipped={} misses={} ====",
        RunKind::Evacuation,
        ctx.run_id,
        summary.replaced,
        summary.skipped,
        summary.misses
    ));
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;
    use std::fs;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    fn write_file(path: &Path, content: &[u8]) {
        let mut file = fs::File::create(path).expect("Failed to create file");
        file.write_all(content).expect("Failed to write file");
    }

    fn base_config(root: &Path) -> (Configuration, PathBuf, PathBuf, PathBuf) {
        let root_dir = root.join("root");
        let backup_dir = root.join("backup");
        let evacuation_dir = root.join("evacuation");
        fs::create_dir(&root_dir).expect("Failed to create root");
        fs::create_dir(&backup_dir).expect("Failed to create backup");
        fs::create_dir(&evacuation_dir).expect("Failed to create evacuation");

        let config = Configuration {
            root_dir: Some(root_dir.clone()),
            backup_dir: Some(backup_dir.clone()),
            evacuation_dir: Some(evacuation_dir.clone()),
            log_dir: None,
            archive_months: Some(12),
            evacuation_year: Some(2010),
            mount: None,
        };
        (config, root_dir, backup_dir, evacuation_dir)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 6, 1).expect("valid date")
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_replaces_mirrored_day_directory() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (config, root_dir, backup_dir, _) = base_config(temp.path());

        let day_dir = root_dir.join("2019").join("0101");
        fs::create_dir_all(&day_dir).expect("Failed to create day dir");
        write_file(&day_dir.join("a.jpg"), b"12345");
        fs::create_dir(backup_dir.join("0101")).expect("Failed to create backup day");
        write_file(&backup_dir.join("0101").join("a.jpg"), b"12345");

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let summary = run_archive(&ctx).expect("archive run failed");

        assert_eq!(summary.replaced, 1);
        assert_eq!(summary.misses, 0);
        let meta = fs::symlink_metadata(&day_dir).expect("day dir missing");
        assert!(meta.file_type().is_symlink());
        assert_eq!(
            fs::read_link(&day_dir).expect("not a link"),
            backup_dir.join("0101")
        );
        assert!(!root_dir.join("2019").join("0101-bk").exists());
        assert!(log.contains("==== ARCHIVE run"));
        assert!(log.contains("finished"));
    }

    #[cfg(unix)]
    #[test]
    fn test_archive_verification_miss_skips_and_continues() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (config, root_dir, backup_dir, _) = base_config(temp.path());

        // 0101 has a file the backup lacks; 0102 is fully mirrored.
        let miss_dir = root_dir.join("2019").join("0101");
        fs::create_dir_all(&miss_dir).expect("Failed to create day dir");
        write_file(&miss_dir.join("a.jpg"), b"12345");
        fs::create_dir(backup_dir.join("0101")).expect("Failed to create backup day");

        let hit_dir = root_dir.join("2019").join("0102");
        fs::create_dir(&hit_dir).expect("Failed to create day dir");
        write_file(&hit_dir.join("b.jpg"), b"678");
        fs::create_dir(backup_dir.join("0102")).expect("Failed to create backup day");
        write_file(&backup_dir.join("0102").join("b.jpg"), b"876");

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let summary = run_archive(&ctx).expect("archive run failed");

        assert_eq!(summary.replaced, 1);
        assert_eq!(summary.misses, 1);
        assert!(miss_dir.is_dir(), "missed directory is left untouched");
        assert!(
            fs::symlink_metadata(&hit_dir)
                .expect("hit dir missing")
                .file_type()
                .is_symlink(),
            "the run continued past the miss"
        );
        assert!(log.contains("backup file missing"));
    }

    #[test]
    fn test_archive_skips_unshaped_and_recent_names() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (config, root_dir, _, _) = base_config(temp.path());

        fs::create_dir_all(root_dir.join("2019").join("notes")).expect("Failed to create dir");
        fs::create_dir_all(root_dir.join("2020").join("0520")).expect("Failed to create dir");
        // Not a directory, ignored outright.
        write_file(&root_dir.join("2019").join("stray.txt"), b"x");
        // Year name is not numeric, ignored outright.
        fs::create_dir_all(root_dir.join("misc").join("0101")).expect("Failed to create dir");

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let summary = run_archive(&ctx).expect("archive run failed");

        assert_eq!(summary.replaced, 0);
        assert_eq!(summary.misses, 0);
        // "notes" fails the shape, 2020/0520 is newer than 2019-06-01.
        assert_eq!(summary.skipped, 2);
        assert!(root_dir.join("2019").join("notes").is_dir());
    }

    #[test]
    fn test_archive_invalid_date_aborts() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (config, root_dir, _, _) = base_config(temp.path());
        fs::create_dir_all(root_dir.join("2019").join("0132")).expect("Failed to create dir");

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let result = run_archive(&ctx);
        assert!(matches!(result, Err(ArchiveError::DateParse { .. })));
    }

    #[test]
    fn test_archive_preflight_rejects_missing_backup_dir() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (mut config, _, backup_dir, _) = base_config(temp.path());
        fs::remove_dir(&backup_dir).expect("Failed to remove backup dir");
        config.backup_dir = Some(backup_dir);

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let result = run_archive(&ctx);
        assert!(matches!(result, Err(ArchiveError::ConfigDir { role: "backup", .. })));
        assert!(
            !log.contains("started"),
            "pre-flight failures happen before the start marker"
        );
    }

    #[test]
    fn test_archive_requires_month_threshold() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (mut config, _, _, _) = base_config(temp.path());
        config.archive_months = None;

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let result = run_archive(&ctx);
        assert!(matches!(
            result,
            Err(ArchiveError::ConfigKey { key: "ArchiveMonth" })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_evacuation_stages_mirror_then_replaces() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (config, root_dir, backup_dir, evacuation_dir) = base_config(temp.path());

        let year_dir = root_dir.join("2010");
        fs::create_dir(&year_dir).expect("Failed to create year dir");
        write_file(&year_dir.join("a.jpg"), b"12345");
        fs::create_dir(backup_dir.join("2010")).expect("Failed to create backup year");
        write_file(&backup_dir.join("2010").join("a.jpg"), b"12345");
        write_file(&backup_dir.join("2010").join("b.jpg"), b"678");

        // A newer year stays put.
        fs::create_dir(root_dir.join("2011")).expect("Failed to create year dir");

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let summary = run_evacuation(&ctx).expect("evacuation run failed");

        assert_eq!(summary.replaced, 1);
        assert_eq!(summary.skipped, 1);

        // The staged copy mirrors the backup, sizes included.
        let staged = evacuation_dir.join("2010");
        assert_eq!(fs::read(staged.join("a.jpg")).expect("read a"), b"12345");
        assert_eq!(fs::read(staged.join("b.jpg")).expect("read b"), b"678");

        let meta = fs::symlink_metadata(&year_dir).expect("year dir missing");
        assert!(meta.file_type().is_symlink());
        assert_eq!(fs::read_link(&year_dir).expect("not a link"), staged);
        assert!(!root_dir.join("2010-bk").exists());
        assert!(root_dir.join("2011").is_dir());
        assert!(log.contains("staged copy"));
    }

    #[cfg(unix)]
    #[test]
    fn test_evacuation_reuses_existing_evacuation_copy() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (config, root_dir, backup_dir, evacuation_dir) = base_config(temp.path());

        let year_dir = root_dir.join("2009");
        fs::create_dir(&year_dir).expect("Failed to create year dir");
        fs::create_dir(backup_dir.join("2009")).expect("Failed to create backup year");
        write_file(&backup_dir.join("2009").join("a.jpg"), b"123");
        fs::create_dir(evacuation_dir.join("2009")).expect("Failed to create evacuation year");
        write_file(&evacuation_dir.join("2009").join("a.jpg"), b"123");

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let summary = run_evacuation(&ctx).expect("evacuation run failed");

        assert_eq!(summary.replaced, 1);
        assert!(
            !log.contains("staged copy"),
            "an existing evacuation copy is not re-staged"
        );
    }

    #[test]
    fn test_evacuation_miss_leaves_root_untouched() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (config, root_dir, backup_dir, evacuation_dir) = base_config(temp.path());

        let year_dir = root_dir.join("2008");
        fs::create_dir(&year_dir).expect("Failed to create year dir");
        fs::create_dir(backup_dir.join("2008")).expect("Failed to create backup year");
        write_file(&backup_dir.join("2008").join("a.jpg"), b"12345");
        // Evacuation copy exists but is incomplete; it is not re-staged,
        // so verification must fail.
        fs::create_dir(evacuation_dir.join("2008")).expect("Failed to create evacuation year");

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let summary = run_evacuation(&ctx).expect("evacuation run failed");

        assert_eq!(summary.replaced, 0);
        assert_eq!(summary.misses, 1);
        assert!(year_dir.is_dir());
    }

    #[test]
    fn test_evacuation_requires_evacuation_directory() {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let (mut config, _, _, _) = base_config(temp.path());
        config.evacuation_dir = None;

        let log = MemoryLog::new();
        let ctx = RunContext::new(&config, &log, today());
        let result = run_evacuation(&ctx);
        assert!(matches!(
            result,
            Err(ArchiveError::ConfigKey { key: "EvacuationDirectory" })
        ));
    }

    #[test]
    fn test_run_kind_display_matches_command_words() {
        assert_eq!(RunKind::Archive.to_string(), "ARCHIVE");
        assert_eq!(RunKind::Evacuation.to_string(), "EVACUATION");
    }
}
