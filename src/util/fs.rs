//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::Path;

use tempfile::TempDir;

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write a file, creating parent directories as needed.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> io::Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

/// Create a temporary directory next to `dest`, on the same filesystem,
/// so it can later be renamed over `dest`.
pub fn staging_dir_for(dest: &Path) -> io::Result<TempDir> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;
    tempfile::Builder::new().prefix(".xcgen-").tempdir_in(parent)
}

/// Move a fully written staging directory into place, replacing `dest`.
pub fn replace_dir(staged: TempDir, dest: &Path) -> io::Result<()> {
    remove_dir_all_if_exists(dest)?;
    fs::rename(staged.path(), dest)?;
    // The staging path no longer exists; dropping the guard is a no-op.
    drop(staged);
    Ok(())
}
