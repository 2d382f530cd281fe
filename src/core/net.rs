// src/core/net.rs
// Page acquisition. The pipeline only sees `PageSource`; HTTP and saved files are
// two implementations of it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header;
use scraper::Html;

use crate::config::consts::{ACCEPT_LANGUAGE, USER_AGENT};
use crate::error::FetchError;

/// Page markup as fetched, not yet parsed.
#[derive(Clone, Debug)]
pub struct RawPage {
    pub url: String,
    pub html: String,
}

impl RawPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self { url: url.into(), html: html.into() }
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

pub trait PageSource {
    fn fetch_page(&mut self, url: &str) -> Result<RawPage, FetchError>;
}

/// HTTP session. Acquire with `open` or, preferably, `scoped`, which guarantees
/// the session is dropped before the caller's result is returned.
pub struct FetchSession {
    client: Client,
    requests: usize,
}

impl FetchSession {
    pub fn open(timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_static(ACCEPT_LANGUAGE));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(FetchError::Session)?;

        logd!("fetch session opened (timeout {:?})", timeout);
        Ok(Self { client, requests: 0 })
    }

    /// Run `f` with a fresh session; the session is closed on every exit path.
    pub fn scoped<T, E>(
        timeout: Duration,
        f: impl FnOnce(&mut FetchSession) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<FetchError>,
    {
        let mut session = FetchSession::open(timeout)?;
        let out = f(&mut session);
        drop(session);
        out
    }
}

impl PageSource for FetchSession {
    fn fetch_page(&mut self, url: &str) -> Result<RawPage, FetchError> {
        self.requests += 1;
        logd!("GET {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|source| FetchError::Http { url: s!(url), source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { url: s!(url), status: status.as_u16() });
        }

        let html = resp
            .text()
            .map_err(|source| FetchError::Http { url: s!(url), source })?;
        logd!("{url}: {} bytes", html.len());
        Ok(RawPage::new(url, html))
    }
}

impl Drop for FetchSession {
    fn drop(&mut self) {
        logd!("fetch session closed after {} request(s)", self.requests);
    }
}

/// Saved page on disk; `url` passed to `fetch_page` is kept for provenance only.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl PageSource for FileSource {
    fn fetch_page(&mut self, url: &str) -> Result<RawPage, FetchError> {
        let html = fs::read_to_string(&self.path)
            .map_err(|source| FetchError::Read { path: self.path.clone(), source })?;
        logd!("read {} ({} bytes) in place of {url}", self.path.display(), html.len());
        Ok(RawPage::new(url, html))
    }
}
