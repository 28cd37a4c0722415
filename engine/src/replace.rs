//! The directory replace protocol.
//!
//! Converts a verified directory into a symlink to its backup copy:
//! move the directory aside, create the symlink, then delete the
//! moved-aside content. The individual filesystem primitives are atomic;
//! their composition is a best-effort transaction with one documented
//! failure window (see `replace_with_symlink`).

use std::fs;
use std::io;
use std::path::Path;

use crate::error::ArchiveError;
use crate::fs_ops;
use crate::logging::LogSink;
use crate::model::ReplaceOperation;

/// Replace `target` with a symlink to `backup`.
///
/// Protocol:
/// 1. Rename `target` to the `-bk` sibling (same filesystem).
/// 2. Create a symlink at `target` pointing to `backup`.
/// 3. If the symlink fails, rename the sibling back and return
///    `SymlinkFailed` (or `RollbackFailed` when the restore itself
///    fails).
/// 4. If the symlink succeeds, delete the sibling's content and the
///    sibling itself.
///
/// On success `target` is a working symlink and no `-bk` path remains.
/// After `SymlinkFailed` the original directory is back in place intact.
/// The one failure window: when step 4 fails, the symlink stays installed
/// but the sibling is orphaned on disk; that surfaces as `CleanupFailed`,
/// never silently.
pub fn replace_with_symlink(
    target: &Path,
    backup: &Path,
    log: &dyn LogSink,
) -> Result<(), ArchiveError> {
    replace_with(target, backup, log, fs_ops::symlink_dir)
}

fn replace_with(
    target: &Path,
    backup: &Path,
    log: &dyn LogSink,
    make_link: impl Fn(&Path, &Path) -> io::Result<()>,
) -> Result<(), ArchiveError> {
    let op = ReplaceOperation::new(target, backup);

    fs::rename(&op.target, &op.temp).map_err(|e| ArchiveError::RenameFailed {
        from: op.target.clone(),
        to: op.temp.clone(),
        source: e,
    })?;

    if let Err(link_err) = make_link(&op.link_target, &op.target) {
        // Put the directory back where it was. If even that fails the
        // content is stranded at the temporary path.
        return Err(match fs::rename(&op.temp, &op.target) {
            Ok(()) => ArchiveError::SymlinkFailed {
                target: op.target,
                backup: op.link_target,
                source: link_err,
            },
            Err(rollback_err) => ArchiveError::RollbackFailed {
                target: op.target,
                temp: op.temp,
                source: rollback_err,
            },
        });
    }
    log.info(&format!(
        "symlink created: {} -> {}",
        op.target.display(),
        op.link_target.display()
    ));

    if let Err(remove_err) = fs_ops::remove_tree(&op.temp) {
        return Err(ArchiveError::CleanupFailed {
            temp: op.temp,
            source: Box::new(remove_err),
        });
    }
    log.info(&format!("directory removed: {}", op.target.display()));
    Ok(())
}
