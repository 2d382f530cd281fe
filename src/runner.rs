// src/runner.rs
use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config::options::{CorruptPolicy, PageSource, RunOptions},
    core::{FetchSession, FileSource, PageSource as Source},
    data::Snapshot,
    error::{FieldError, RunError},
    progress::Progress,
    scrape::{self, Assembly},
    specs::notice::RecordBuilder,
    store::{Archive, ArchiveLock, ArchiveStore, MergeReport},
};

/// What one run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub snapshot: Snapshot,
    pub rejected: Vec<FieldError>,
    pub report: MergeReport,
    pub archive: Archive,
    /// `None` on a dry run.
    pub written: Option<PathBuf>,
}

/// One full pass: lock, load, fetch, assemble, merge, save.
/// `progress` can be None (no UI updates) or Some(&mut impl Progress).
pub fn run(opts: &RunOptions, progress: Option<&mut dyn Progress>) -> Result<RunSummary, RunError> {
    match &opts.source {
        PageSource::Live => {
            FetchSession::scoped(opts.timeout, |session| run_with_source(opts, session, progress))
        }
        PageSource::File(path) => run_with_source(opts, &mut FileSource::new(path), progress),
    }
}

/// Same as [`run`] with the page source supplied by the caller.
pub fn run_with_source(
    opts: &RunOptions,
    source: &mut dyn Source,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, RunError> {
    let out = run_once(opts, source, reborrow(&mut progress));
    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    out
}

/// Shorter-lived handle on the sink so it can be passed on and used again.
fn reborrow<'a>(progress: &'a mut Option<&mut dyn Progress>) -> Option<&'a mut dyn Progress> {
    progress.as_mut().map(|p| &mut **p as &mut dyn Progress)
}

fn run_once(
    opts: &RunOptions,
    source: &mut dyn Source,
    progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, RunError> {
    let builder = RecordBuilder::new()?;

    // dry runs neither write nor move anything
    let _lock = if opts.dry_run { None } else { Some(ArchiveLock::acquire(&opts.archive_path)?) };
    let policy = if opts.dry_run { CorruptPolicy::Abort } else { opts.on_corrupt };

    let mut store = ArchiveStore::new(&opts.archive_path, policy);
    let mut archive = store.load()?;

    let observed_at = Utc::now();
    logf!("fetching {}", opts.page_url);
    let page = source.fetch_page(&opts.page_url)?;
    let doc = page.document();

    let Assembly { snapshot, rejected } =
        scrape::assemble(&builder, &doc, observed_at, progress);
    if snapshot.is_empty() {
        logw!("no draw blocks found on {}; page layout changed or not rendered?", page.url);
    }

    let report = archive.merge_in(&snapshot);

    let written = if opts.dry_run {
        logf!("dry run: {} not written", store.path().display());
        None
    } else {
        store.save(&archive)?;
        Some(store.path().to_path_buf())
    };

    Ok(RunSummary { snapshot, rejected, report, archive, written })
}
