// src/scrape.rs
// Snapshot assembly: run the record builder for every game against one page.

use chrono::{DateTime, Utc};
use scraper::Html;

use crate::{
    core::RawPage,
    data::{GameKind, Snapshot},
    error::{FieldError, SelectorError},
    progress::Progress,
    specs::notice::RecordBuilder,
};

/// A snapshot plus the blocks that were present but rejected.
#[derive(Debug)]
pub struct Assembly {
    pub snapshot: Snapshot,
    pub rejected: Vec<FieldError>,
}

/// Stateless and deterministic for a given `doc` and `observed_at`.
pub fn assemble(
    builder: &RecordBuilder,
    doc: &Html,
    observed_at: DateTime<Utc>,
    mut progress: Option<&mut dyn Progress>,
) -> Assembly {
    let mut snapshot = Snapshot::new(observed_at);
    let mut rejected = Vec::new();

    if let Some(p) = progress.as_deref_mut() {
        p.begin(GameKind::ALL.len());
    }

    for game in GameKind::ALL {
        match builder.build(doc, game, observed_at) {
            Ok(Some(record)) => {
                if let Some(p) = progress.as_deref_mut() {
                    p.game_done(game, record.period);
                }
                snapshot.insert(record);
            }
            Ok(None) => {
                if let Some(p) = progress.as_deref_mut() {
                    p.game_skipped(game, "not on page");
                }
            }
            Err(e) => {
                logw!("{e}; record excluded from snapshot");
                if let Some(p) = progress.as_deref_mut() {
                    p.game_skipped(game, &e.to_string());
                }
                rejected.push(e);
            }
        }
    }

    logf!(
        "snapshot: {} game(s) [{}], {} rejected",
        snapshot.len(),
        snapshot.games().map(GameKind::as_str).collect::<Vec<_>>().join(","),
        rejected.len()
    );
    Assembly { snapshot, rejected }
}

/// Convenience wrapper: compile selectors, parse `page`, assemble.
pub fn collect_snapshot(page: &RawPage, observed_at: DateTime<Utc>) -> Result<Snapshot, SelectorError> {
    let builder = RecordBuilder::new()?;
    let doc = page.document();
    Ok(assemble(&builder, &doc, observed_at, None).snapshot)
}
