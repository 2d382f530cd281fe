// src/error.rs
//! Error taxonomy.
//!
//! Field-level problems (`FieldError`) are recovered where they happen and never
//! leave the record builder. Fetch and store errors end the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::data::GameKind;

/// The page could not be retrieved. Fatal for the run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not start HTTP session: {0}")]
    Session(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not read page from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One field inside an otherwise-present notice block could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{game}: stage text {text:?} has no digits")]
    MissingPeriod { game: GameKind, text: String },

    #[error("{game}: period {digits} does not fit in u64")]
    PeriodOutOfRange { game: GameKind, digits: String },
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The archive exists but is not valid archive JSON.
    #[error("archive {} is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("archive I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive {} is locked by another run (lock file {})", archive.display(), lock.display())]
    Locked { archive: PathBuf, lock: PathBuf },

    #[error("archive {} changed on disk since it was loaded; refusing to overwrite", path.display())]
    ConcurrentModification { path: PathBuf },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }
}

/// A descriptor selector failed to compile.
#[derive(Debug, Error)]
#[error("bad selector {selector:?}: {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}

/// Everything that can end a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Selector(#[from] SelectorError),
}
