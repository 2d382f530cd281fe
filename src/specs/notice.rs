// src/specs/notice.rs
//! Record builder for one `div.notice-item` block.
//!
//! One algorithm for all games, parameterized by [`GameSpec`]. Field problems are
//! recovered here: bad amounts become 0, bad numbers are dropped, missing links
//! stay absent. Only a missing period rejects the block.

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use super::{GAMES, GameSpec, NUMBERS, POOL, STAGE};
use crate::config::consts::BASE_ORIGIN;
use crate::core::extract::{extract_amount, extract_digits, parse_leading_int};
use crate::core::links::{absolutize, clean_href};
use crate::core::sanitize::node_text;
use crate::data::{DrawRecord, GameKind, Links};
use crate::error::{FieldError, SelectorError};

struct GameSelectors {
    spec: &'static GameSpec,
    root: Selector,
    detail: Selector,
    history: Selector,
    video: Option<Selector>,
}

/// Compiled selectors for every game. Build once per run.
pub struct RecordBuilder {
    origin: String,
    stage: Selector,
    pool: Selector,
    numbers: Selector,
    games: Vec<GameSelectors>,
}

fn compile(sel: &str) -> Result<Selector, SelectorError> {
    Selector::parse(sel).map_err(|e| SelectorError { selector: s!(sel), reason: e.to_string() })
}

impl RecordBuilder {
    pub fn new() -> Result<Self, SelectorError> {
        Self::with_origin(BASE_ORIGIN)
    }

    /// `origin` is prefixed to root-relative links (`https://host`).
    pub fn with_origin(origin: &str) -> Result<Self, SelectorError> {
        let mut games = Vec::with_capacity(GAMES.len());
        for spec in &GAMES {
            games.push(GameSelectors {
                spec,
                root: compile(spec.root)?,
                detail: compile(spec.detail)?,
                history: compile(&spec.history_selector())?,
                video: spec.video.map(compile).transpose()?,
            });
        }
        Ok(Self {
            origin: s!(origin.trim_end_matches('/')),
            stage: compile(STAGE)?,
            pool: compile(POOL)?,
            numbers: compile(NUMBERS)?,
            games,
        })
    }

    fn selectors(&self, game: GameKind) -> &GameSelectors {
        // `games` is built from GAMES, which lists every GameKind in declaration order
        &self.games[game as usize]
    }

    /// - `Ok(None)`: no block for `game` on the page.
    /// - `Err(_)`: no matching block has a readable period; the record is dropped.
    pub fn build(
        &self,
        doc: &Html,
        game: GameKind,
        observed_at: DateTime<Utc>,
    ) -> Result<Option<DrawRecord>, FieldError> {
        let sel = self.selectors(game);
        let mut blocks = doc.select(&sel.root);
        let Some(first) = blocks.next() else {
            logd!("{game}: no notice block");
            return Ok(None);
        };

        // the first block with a readable period wins; later ones only stand in
        // when an earlier match (e.g. the other qlc class spelling) is broken
        let (block, period) = match self.period(game, &first) {
            Ok(period) => (first, period),
            Err(e) => match blocks.find_map(|b| self.period(game, &b).ok().map(|p| (b, p))) {
                Some(found) => {
                    logw!("{e}; using the next {game} block");
                    found
                }
                None => return Err(e),
            },
        };
        let mut record = DrawRecord::new(game, period, observed_at);

        if sel.spec.has_pool {
            let text = block.select(&self.pool).next().map(|n| node_text(&n));
            record.pool_amount = Some(extract_amount(text.as_deref()));
        }

        record.numbers = block
            .select(&self.numbers)
            .filter_map(|n| {
                let t = node_text(&n);
                let v = parse_leading_int(&t);
                if v.is_none() {
                    logw!("{game} {period}: dropping unreadable number {t:?}");
                }
                v
            })
            .collect();

        record.links = Links {
            detail: first_href(&block, &sel.detail),
            history: first_href(&block, &sel.history),
            video: sel.video.as_ref().and_then(|v| first_href(&block, v)),
        }
        .map_present(|h| absolutize(&h, &self.origin));

        logd!(
            "{game}: period {period}, pool {:?}, {} number(s)",
            record.pool_amount,
            record.numbers.len()
        );
        Ok(Some(record))
    }

    fn period(&self, game: GameKind, block: &ElementRef<'_>) -> Result<u64, FieldError> {
        let text = block.select(&self.stage).next().map(|n| node_text(&n)).unwrap_or_default();
        let digits = extract_digits(&text);
        if digits.is_empty() {
            return Err(FieldError::MissingPeriod { game, text });
        }
        digits
            .parse::<u64>()
            .map_err(|_| FieldError::PeriodOutOfRange { game, digits })
    }
}

fn first_href(block: &ElementRef<'_>, sel: &Selector) -> Option<String> {
    block
        .select(sel)
        .find_map(|el| el.value().attr("href").and_then(clean_href))
        .map(|h| s!(h))
}
