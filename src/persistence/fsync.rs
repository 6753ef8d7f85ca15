//! fsync helpers for the atomic publish of the seen-PR file.
//!
//! A rename only survives power loss once the parent directory entry is
//! synced, so publishing a file needs both a file and a directory fsync.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Syncs a file's contents and metadata to disk.
pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Syncs a directory so that entries created or renamed inside it are durable.
///
/// # Errors
///
/// Returns an error if the directory cannot be opened or the sync fails.
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    let dir = OpenOptions::new().read(true).open(dir_path)?;
    dir.sync_all()
}

/// Returns the directory a file lives in, treating a bare file name as
/// relative to the working directory.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
