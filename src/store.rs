// src/store.rs
//! Archive store.
//!
//! - `Archive`: per-game lists, unique by period, sorted descending.
//! - `Archive::merge_in`: last-write-wins by (game, period) on recency.
//! - `ArchiveStore`: load / save of the JSON file with a read-generation check.
//! - `ArchiveLock`: one run per archive at a time.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::config::consts::{CORRUPT_SUFFIX, LOCK_SUFFIX, STALE_LOCK_SECS};
use crate::config::options::{CorruptPolicy, sibling_with_suffix};
use crate::data::{DrawRecord, GameKind, Links, Snapshot};
use crate::error::StoreError;
use crate::file::{self, ensure_directory, parent_dir};
use crate::specs::spec_for;

/* ---------------- Archive ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Archive {
    games: BTreeMap<GameKind, Vec<DrawRecord>>,
}

impl Default for Archive {
    fn default() -> Self {
        Self { games: GameKind::ALL.into_iter().map(|g| (g, Vec::new())).collect() }
    }
}

/// What one merge did, for logs and the CLI summary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Period not seen before.
    pub added: usize,
    /// Same period, incoming won and the draw content differed.
    pub replaced: usize,
    /// Same period, incoming won with the same draw content (only the
    /// observation time moved).
    pub unchanged: usize,
    /// Same period, existing was observed later and kept.
    pub stale: usize,
}

impl Archive {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from arbitrary lists; duplicates and order are repaired.
    pub fn from_lists(lists: impl IntoIterator<Item = (GameKind, Vec<DrawRecord>)>) -> Self {
        let mut out = Self::empty();
        for (game, list) in lists {
            out.games.entry(game).or_default().extend(list);
        }
        out.normalize();
        out
    }

    pub fn records(&self, game: GameKind) -> &[DrawRecord] {
        self.games.get(&game).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn latest(&self, game: GameKind) -> Option<&DrawRecord> {
        self.records(game).first()
    }

    pub fn total(&self) -> usize {
        self.games.values().map(Vec::len).sum()
    }

    /// Dedup by period (first-listed wins unless a later entry is strictly newer)
    /// and sort descending, for every game.
    pub fn normalize(&mut self) {
        for game in GameKind::ALL {
            let list = self.games.entry(game).or_default();
            let by_period = index_by_period(std::mem::take(list));
            *list = by_period.into_values().rev().collect();
        }
    }

    /// Pure form of [`Archive::merge_in`].
    pub fn merge(&self, incoming: &Snapshot) -> Archive {
        let mut out = self.clone();
        out.merge_in(incoming);
        out
    }

    pub fn merge_in(&mut self, incoming: &Snapshot) -> MergeReport {
        let mut report = MergeReport::default();

        for game in GameKind::ALL {
            let list = self.games.entry(game).or_default();
            let mut by_period = index_by_period(std::mem::take(list));

            if let Some(rec) = incoming.get(game) {
                match by_period.entry(rec.period) {
                    Entry::Vacant(v) => {
                        v.insert(rec.clone());
                        report.added += 1;
                    }
                    Entry::Occupied(mut o) => {
                        if supersedes(o.get(), rec, true) {
                            if o.get().same_draw(rec) { report.unchanged += 1; } else { report.replaced += 1; }
                            o.insert(rec.clone());
                        } else {
                            logw!("{game} {}: incoming observation is older than archived one; kept archive", rec.period);
                            report.stale += 1;
                        }
                    }
                }
            }

            *list = by_period.into_values().rev().collect();
        }

        logf!(
            "merge: {} added, {} replaced, {} unchanged, {} stale",
            report.added, report.replaced, report.unchanged, report.stale
        );
        report
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(&self.games)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Parse archive JSON. Whitespace-only input is an empty archive.
    pub fn from_json_slice(bytes: &[u8]) -> serde_json::Result<Archive> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Archive::empty());
        }
        let wire: BTreeMap<GameKind, Vec<StoredRecord>> = serde_json::from_slice(bytes)?;
        Ok(Archive::from_lists(wire.into_iter().map(|(game, list)| {
            let records = list.into_iter().filter_map(|r| r.into_record(game)).collect();
            (game, records)
        })))
    }
}

/// Should `candidate` replace `current`? The later observation wins; when the
/// times are equal or either is unknown, `ties_to_candidate` decides.
fn supersedes(current: &DrawRecord, candidate: &DrawRecord, ties_to_candidate: bool) -> bool {
    match (current.recency(), candidate.recency()) {
        (Some(a), Some(b)) if b != a => b > a,
        _ => ties_to_candidate,
    }
}

fn index_by_period(records: Vec<DrawRecord>) -> BTreeMap<u64, DrawRecord> {
    let mut by_period: BTreeMap<u64, DrawRecord> = BTreeMap::new();
    for r in records {
        match by_period.entry(r.period) {
            Entry::Vacant(v) => { v.insert(r); }
            Entry::Occupied(mut o) => {
                if supersedes(o.get(), &r, false) { o.insert(r); }
            }
        }
    }
    by_period
}

/// On-disk record, tolerant of files written by older scrapers
/// (null periods, null numbers, no `observedAt`).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    period: Option<u64>,
    #[serde(default)]
    pool_amount: Option<u64>,
    #[serde(default)]
    numbers: Vec<Option<u32>>,
    #[serde(default)]
    links: Links,
    #[serde(default)]
    observed_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    /// The list key is authoritative for the game; fields the game does not
    /// have are dropped.
    fn into_record(self, game: GameKind) -> Option<DrawRecord> {
        let Some(period) = self.period else {
            logw!("{game}: archived record without a period dropped");
            return None;
        };
        let spec = spec_for(game);
        let mut links = self.links;
        if spec.video.is_none() {
            links.video = None;
        }
        Some(DrawRecord {
            game,
            date: self.date,
            period,
            pool_amount: if spec.has_pool { Some(self.pool_amount.unwrap_or(0)) } else { None },
            numbers: self.numbers.into_iter().flatten().collect(),
            links,
            observed_at: self.observed_at,
        })
    }
}

/* ---------------- Persistence ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Generation {
    Missing,
    Content(u64),
}

impl Generation {
    fn of(bytes: Option<&[u8]>) -> Self {
        match bytes {
            None => Generation::Missing,
            Some(b) => {
                let mut h = DefaultHasher::new();
                b.hash(&mut h);
                Generation::Content(h.finish())
            }
        }
    }
}

pub struct ArchiveStore {
    path: PathBuf,
    on_corrupt: CorruptPolicy,
    generation: Option<Generation>,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>, on_corrupt: CorruptPolicy) -> Self {
        Self { path: path.into(), on_corrupt, generation: None }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file -> empty archive. Unparsable file -> `StoreError::Parse`
    /// unless the policy says to move it aside and start over.
    pub fn load(&mut self) -> Result<Archive, StoreError> {
        let bytes = file::read_archive_file(&self.path).map_err(|e| StoreError::io(&self.path, e))?;

        let Some(bytes) = bytes else {
            logf!("no archive at {}; starting empty", self.path.display());
            self.generation = Some(Generation::Missing);
            return Ok(Archive::empty());
        };

        match Archive::from_json_slice(&bytes) {
            Ok(archive) => {
                logf!("loaded {} record(s) from {}", archive.total(), self.path.display());
                self.generation = Some(Generation::of(Some(&bytes)));
                Ok(archive)
            }
            Err(source) => match self.on_corrupt {
                CorruptPolicy::Abort => {
                    loge!("archive {} is unreadable ({source}); not touching it", self.path.display());
                    Err(StoreError::Parse { path: self.path.clone(), source })
                }
                CorruptPolicy::BackupAndReset => {
                    let moved = file::move_aside(&self.path, CORRUPT_SUFFIX)
                        .map_err(|e| StoreError::io(&self.path, e))?;
                    logw!(
                        "archive {} is unreadable ({source}); moved to {} and starting empty",
                        self.path.display(),
                        moved.display()
                    );
                    self.generation = Some(Generation::Missing);
                    Ok(Archive::empty())
                }
            },
        }
    }

    /// Overwrite the archive atomically. Refuses if the file changed since `load`.
    pub fn save(&self, archive: &Archive) -> Result<(), StoreError> {
        if let Some(expected) = self.generation {
            let current = file::read_archive_file(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
            if Generation::of(current.as_deref()) != expected {
                return Err(StoreError::ConcurrentModification { path: self.path.clone() });
            }
        }

        let bytes = archive.to_json_bytes().map_err(|e| StoreError::io(&self.path, io::Error::other(e)))?;
        file::write_archive_file(&self.path, &bytes).map_err(|e| StoreError::io(&self.path, e))?;
        logf!("wrote {} record(s) to {}", archive.total(), self.path.display());
        Ok(())
    }
}

/* ---------------- Single-instance lock ---------------- */

/// `<archive>.lock`, created exclusively. Holds a token unique to this holder;
/// the file is only removed while it still carries that token.
#[derive(Debug)]
pub struct ArchiveLock {
    path: PathBuf,
    token: String,
}

impl ArchiveLock {
    pub fn acquire(archive: &Path) -> Result<Self, StoreError> {
        Self::acquire_with(archive, Duration::from_secs(STALE_LOCK_SECS))
    }

    /// A lock file older than `stale_after` is assumed abandoned and reclaimed.
    pub fn acquire_with(archive: &Path, stale_after: Duration) -> Result<Self, StoreError> {
        let path = sibling_with_suffix(archive, LOCK_SUFFIX);
        ensure_directory(parent_dir(&path)).map_err(|e| StoreError::io(&path, e))?;

        let locked = || StoreError::Locked { archive: archive.to_path_buf(), lock: path.clone() };
        let token = lock_token();

        match create_lock_file(&path, &token) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let seen = read_lock(&path).map_err(|e| StoreError::io(&path, e))?;
                if !is_stale(&path, stale_after) {
                    return Err(locked());
                }
                // only remove the holder that was judged stale
                if read_lock(&path).map_err(|e| StoreError::io(&path, e))? != seen {
                    return Err(locked());
                }
                logw!("reclaiming stale lock {}", path.display());
                match fs::remove_file(&path) {
                    Ok(()) => {}
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(StoreError::io(&path, e)),
                }
                create_lock_file(&path, &token).map_err(|e| {
                    if e.kind() == io::ErrorKind::AlreadyExists { locked() } else { StoreError::io(&path, e) }
                })?;
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        }

        logd!("lock acquired: {}", path.display());
        Ok(Self { path, token })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ArchiveLock {
    fn drop(&mut self) {
        match read_lock(&self.path) {
            Ok(Some(c)) if holds_token(&c, &self.token) => match fs::remove_file(&self.path) {
                Ok(()) => logd!("lock released: {}", self.path.display()),
                Err(e) => logw!("could not remove lock {}: {e}", self.path.display()),
            },
            Ok(Some(_)) => logw!("lock {} was taken over by another run; left in place", self.path.display()),
            Ok(None) => logw!("lock {} already gone", self.path.display()),
            Err(e) => logw!("could not read lock {}: {e}", self.path.display()),
        }
    }
}

fn lock_token() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    format!(
        "{}-{}-{}",
        std::process::id(),
        Utc::now().timestamp_micros(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

fn holds_token(contents: &str, token: &str) -> bool {
    contents.split_whitespace().any(|field| field.strip_prefix("token=") == Some(token))
}

fn create_lock_file(path: &Path, token: &str) -> io::Result<()> {
    let mut f = OpenOptions::new().write(true).create_new(true).open(path)?;
    writeln!(f, "token={token} pid={} at={}", std::process::id(), Utc::now().to_rfc3339())?;
    Ok(())
}

fn read_lock(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(c) => Ok(Some(c)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

fn is_stale(path: &Path, max_age: Duration) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| t.elapsed().ok())
        .is_some_and(|age| age >= max_age)
}
