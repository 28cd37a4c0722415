//! Backup verification.
//!
//! Confirms that a source tree is fully mirrored in a backup tree before
//! anything irreversible happens to the source. The check is deliberately
//! cheap: name plus byte size, no content read. That trades certainty for
//! speed and will not catch same-name same-size files whose bytes differ.

use std::path::Path;

use crate::error::ArchiveError;
use crate::fs_ops;
use crate::logging::LogSink;
use crate::model::EntryKind;

/// Recursively confirm that every entry of `source` has a same-name,
/// same-size counterpart under `mirror`.
///
/// Returns `Ok(false)` as soon as anything is missing, logging the miss at
/// INFO; the caller skips the subtree and continues the walk. Directories
/// recurse; symlinks are compared as leaves. Extra entries on the mirror
/// side are ignored.
///
/// # Errors
/// Returns `ArchiveError::ListDir` if either tree cannot be listed; that
/// aborts the run, unlike a miss.
pub fn verify_backup(
    source: &Path,
    mirror: &Path,
    log: &dyn LogSink,
) -> Result<bool, ArchiveError> {
    if !mirror.exists() {
        log.info(&format!("backup directory missing: {}", mirror.display()));
        return Ok(false);
    }

    let source_entries = fs_ops::list_dir(source)?;
    let mirror_entries = fs_ops::list_dir(mirror)?;

    for entry in &source_entries {
        if entry.kind == EntryKind::Dir {
            if !verify_backup(&entry.path, &mirror.join(&entry.name), log)? {
                return Ok(false);
            }
        } else {
            // Comparison is by name lookup; listing order is irrelevant.
            let found = mirror_entries
                .iter()
                .any(|m| m.name == entry.name && m.size == entry.size);
            if !found {
                log.info(&format!("backup file missing: {}", entry.path.display()));
                return Ok(false);
            }
        }
    }
    Ok(true)
}
