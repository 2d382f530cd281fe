// src/config/options.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::consts::*;

/// Where the notice page comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageSource {
    /// Live HTTP fetch of `RunOptions::page_url`.
    Live,
    /// Previously saved HTML (offline runs, fixtures).
    File(PathBuf),
}

/// What to do when the archive exists but cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorruptPolicy {
    /// Stop the run; the operator decides.
    #[default]
    Abort,
    /// Move the bad file aside as `<file>.corrupt-<stamp>` and start empty.
    BackupAndReset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub page_url: String,
    pub archive_path: PathBuf,
    pub source: PageSource,
    pub on_corrupt: CorruptPolicy,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            page_url: join!(BASE_ORIGIN, NOTICE_PATH),
            archive_path: PathBuf::from(DEFAULT_DATA_DIR).join(DEFAULT_ARCHIVE_FILE),
            source: PageSource::Live,
            on_corrupt: CorruptPolicy::Abort,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            dry_run: false,
        }
    }
}

impl RunOptions {
    /// Accepts a file path or a directory hint (trailing separator or existing dir);
    /// directories get the default archive file name.
    pub fn set_archive_path(&mut self, text: &str) {
        let p = PathBuf::from(text.trim());
        self.archive_path = if looks_like_dir_hint(&p) || p.is_dir() {
            p.join(DEFAULT_ARCHIVE_FILE)
        } else {
            p
        };
    }

    pub fn lock_path(&self) -> PathBuf {
        sibling_with_suffix(&self.archive_path, LOCK_SUFFIX)
    }
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}

/// `data/lottery_data.json` + "lock" -> `data/lottery_data.json.lock`
pub fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}
