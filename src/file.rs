// src/file.rs

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use chrono::Utc;
use tempfile::NamedTempFile;

use crate::config::options::sibling_with_suffix;

/// Whole file, or `None` when it does not exist.
pub fn read_archive_file(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Replace `path` with `bytes` atomically: readers see the old file or the new
/// one, never a prefix. The temp file lives in the target directory so the
/// final rename stays on one filesystem.
pub fn write_archive_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = parent_dir(path);
    ensure_directory(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    // temp file is removed on error paths by NamedTempFile's Drop
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Rename `path` to `<path>.<suffix>-<UTC stamp>` and return the new path.
pub fn move_aside(path: &Path, suffix: &str) -> io::Result<PathBuf> {
    let stamp = Utc::now().format("%Y%m%dT%H%M%SZ");
    let target = sibling_with_suffix(path, &format!("{suffix}-{stamp}"));
    fs::rename(path, &target)?;
    Ok(target)
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

/// Parent directory, with "" (bare file name) mapped to ".".
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
