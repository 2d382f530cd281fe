// tests/runner.rs
//
// Whole pipeline against an offline page source.
//
use std::fs;
use std::path::PathBuf;

use cwl_scrape::config::options::{PageSource, RunOptions};
use cwl_scrape::core::{PageSource as Source, RawPage};
use cwl_scrape::data::GameKind;
use cwl_scrape::error::{FetchError, RunError, StoreError};
use cwl_scrape::progress::Progress;
use cwl_scrape::runner::{self, run_with_source};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/kjgg.html")
}

fn options(dir: &tempfile::TempDir) -> RunOptions {
    let mut o = RunOptions::default();
    o.archive_path = dir.path().join("lottery_data.json");
    o.source = PageSource::File(fixture_path());
    o
}

struct Failing;
impl Source for Failing {
    fn fetch_page(&mut self, url: &str) -> Result<RawPage, FetchError> {
        Err(FetchError::Status { url: url.to_string(), status: 502 })
    }
}

#[test]
fn run_writes_archive_and_rerun_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(&dir);

    let first = runner::run(&opts, None).unwrap();
    assert_eq!(first.snapshot.len(), 4);
    assert_eq!(first.report.added, 4);
    assert_eq!(first.written.as_deref(), Some(opts.archive_path.as_path()));
    assert!(!opts.lock_path().exists(), "lock released");

    let second = runner::run(&opts, None).unwrap();
    assert_eq!(second.report.added, 0);
    assert_eq!(second.report.replaced, 0);
    assert_eq!(second.report.unchanged, 4, "same draws observed again");
    assert_eq!(second.archive.total(), 4);
    assert_eq!(second.archive.latest(GameKind::Ssq).unwrap().period, 2024100);
}

#[test]
fn fetch_failure_leaves_no_archive() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(&dir);

    let err = run_with_source(&opts, &mut Failing, None).unwrap_err();
    assert!(matches!(err, RunError::Fetch(FetchError::Status { status: 502, .. })));
    assert!(!opts.archive_path.exists());
    assert!(!opts.lock_path().exists());
}

/// Serves the fixture, but first puts a non-empty directory where the
/// archive is about to be written.
struct BlocksArchive {
    archive: PathBuf,
}
impl Source for BlocksArchive {
    fn fetch_page(&mut self, url: &str) -> Result<RawPage, FetchError> {
        fs::create_dir(&self.archive).unwrap();
        fs::write(self.archive.join("previous"), "old bytes").unwrap();
        Ok(RawPage::new(url, fs::read_to_string(fixture_path()).unwrap()))
    }
}

#[derive(Default)]
struct Finishes(usize);
impl Progress for Finishes {
    fn finish(&mut self) {
        self.0 += 1;
    }
}

#[test]
fn failed_write_fails_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(&dir);
    let mut source = BlocksArchive { archive: opts.archive_path.clone() };
    let mut progress = Finishes::default();

    let err = run_with_source(&opts, &mut source, Some(&mut progress)).unwrap_err();

    assert!(matches!(err, RunError::Store(StoreError::Io { .. })), "got {err:?}");
    assert_eq!(fs::read_to_string(opts.archive_path.join("previous")).unwrap(), "old bytes");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1, "no temp or lock file left");
    assert_eq!(progress.0, 1, "finish runs on the error path too");
}

#[test]
fn corrupt_archive_aborts_before_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(&dir);
    fs::write(&opts.archive_path, "oops").unwrap();

    let err = runner::run(&opts, None).unwrap_err();
    assert!(matches!(err, RunError::Store(StoreError::Parse { .. })));
    assert_eq!(fs::read_to_string(&opts.archive_path).unwrap(), "oops");
}

#[test]
fn concurrent_run_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(&dir);
    let _held = cwl_scrape::store::ArchiveLock::acquire(&opts.archive_path).unwrap();

    let err = runner::run(&opts, None).unwrap_err();
    assert!(matches!(err, RunError::Store(StoreError::Locked { .. })));
}

#[test]
fn dry_run_does_not_write() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(&dir);
    opts.dry_run = true;

    let summary = runner::run(&opts, None).unwrap();
    assert_eq!(summary.snapshot.len(), 4);
    assert!(summary.written.is_none());
    assert!(!opts.archive_path.exists());
}
