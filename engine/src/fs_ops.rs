//! Filesystem operations module.
//!
//! Every piece of filesystem access used by the workflows flows through
//! this module:
//! - Listing a directory into `DirectoryEntry` values
//! - Recursive copy for staging the evacuation mirror
//! - Single-level delete used by the replace protocol
//! - Writability pre-flight checks and symlink creation

use std::fs;
use std::io;
use std::path::Path;

use crate::error::ArchiveError;
use crate::model::{DirectoryEntry, EntryKind};

/// List the immediate entries of a directory.
///
/// Symlinks are reported as `EntryKind::Symlink` without following them;
/// their size is taken from the link target when it resolves, so a link
/// leaf compares against its backup copy by content size. Directory
/// entries carry size 0.
///
/// # Errors
/// Returns `ArchiveError::ListDir` if the directory cannot be read.
pub fn list_dir(path: &Path) -> Result<Vec<DirectoryEntry>, ArchiveError> {
    let reader = fs::read_dir(path).map_err(|e| ArchiveError::ListDir {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut entries = Vec::new();
    for entry in reader {
        let entry = entry.map_err(|e| ArchiveError::ListDir {
            path: path.to_path_buf(),
            source: e,
        })?;
        let metadata = entry.metadata().map_err(|e| ArchiveError::ListDir {
            path: path.to_path_buf(),
            source: e,
        })?;

        let entry_path = entry.path();
        let file_type = metadata.file_type();
        let (kind, size) = if file_type.is_symlink() {
            // Follow the link for its size; a dangling link counts as 0.
            let size = fs::metadata(&entry_path).map(|m| m.len()).unwrap_or(0);
            (EntryKind::Symlink, size)
        } else if file_type.is_dir() {
            (EntryKind::Dir, 0)
        } else {
            (EntryKind::File, metadata.len())
        };

        entries.push(DirectoryEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry_path,
            kind,
            size,
        });
    }
    Ok(entries)
}

/// Check that a directory exists and is writable.
///
/// Used by the pre-flight checks before any traversal begins.
pub fn dir_writable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_dir() && !metadata.permissions().readonly(),
        Err(_) => false,
    }
}

/// Recursively copy `src` into `dst`, preserving directory structure,
/// file bytes and modification times.
///
/// `dst` must not exist yet; it is created as part of the copy. Only the
/// evacuation workflow calls this, to stage a secondary mirror before
/// verification.
///
/// # Errors
/// Returns `ArchiveError::CreateDir` / `CopyFailed` / `ListDir` on the
/// first failure; a partial copy is left in place for the verifier to
/// reject.
pub fn mirror_tree(src: &Path, dst: &Path) -> Result<(), ArchiveError> {
    let metadata = fs::metadata(src).map_err(|e| ArchiveError::ListDir {
        path: src.to_path_buf(),
        source: e,
    })?;

    if metadata.is_dir() {
        fs::create_dir(dst).map_err(|e| ArchiveError::CreateDir {
            path: dst.to_path_buf(),
            source: e,
        })?;
        for child in list_dir(src)? {
            mirror_tree(&child.path, &dst.join(&child.name))?;
        }
        Ok(())
    } else {
        copy_file_with_mtime(src, dst)
    }
}

/// Copy a single file and carry over its modification time.
fn copy_file_with_mtime(src: &Path, dst: &Path) -> Result<(), ArchiveError> {
    let mut src_file = fs::File::open(src).map_err(|e| ArchiveError::CopyFailed {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    let src_mtime = src_file.metadata().ok().and_then(|m| m.modified().ok());

    let mut dst_file = fs::File::create(dst).map_err(|e| ArchiveError::CopyFailed {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;
    io::copy(&mut src_file, &mut dst_file).map_err(|e| ArchiveError::CopyFailed {
        from: src.to_path_buf(),
        to: dst.to_path_buf(),
        source: e,
    })?;

    // Modification time is informational; failure to carry it over does
    // not fail the copy.
    if let Some(mtime) = src_mtime {
        let _ = filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(mtime));
    }
    Ok(())
}

/// Delete the immediate children of `path`, then `path` itself.
///
/// This is NOT a full recursive delete: a non-empty child directory fails
/// the call. Callers operate on trees whose content was already relocated,
/// so children are expected to be files or empty directories.
///
/// # Errors
/// Returns `ArchiveError::RemoveFailed` naming the first path that could
/// not be deleted.
pub fn remove_tree(path: &Path) -> Result<(), ArchiveError> {
    for child in list_dir(path)? {
        let result = if child.kind == EntryKind::Dir {
            fs::remove_dir(&child.path)
        } else {
            fs::remove_file(&child.path)
        };
        result.map_err(|e| ArchiveError::RemoveFailed {
            path: child.path.clone(),
            source: e,
        })?;
    }
    fs::remove_dir(path).map_err(|e| ArchiveError::RemoveFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Create a directory symlink at `link` pointing to `original`.
#[cfg(unix)]
pub fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(original, link)
}

/// Create a directory symlink at `link` pointing to `original`.
#[cfg(windows)]
pub fn symlink_dir(original: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(original, link)
}
