// src/data.rs
//
// Canonical record shapes shared by the builder, the assembler and the store.
//
// - GameKind:   the four draw games on the notice page.
// - DrawRecord: one observed announcement (one game, one period).
// - Snapshot:   zero-or-one record per game from a single scrape pass.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Declaration order is the on-disk key order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    Ssq,
    Kl8,
    Fc3d,
    Qlc,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [GameKind::Ssq, GameKind::Kl8, GameKind::Fc3d, GameKind::Qlc];

    pub fn as_str(self) -> &'static str {
        match self {
            GameKind::Ssq => "ssq",
            GameKind::Kl8 => "kl8",
            GameKind::Fc3d => "fc3d",
            GameKind::Qlc => "qlc",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
}

impl Links {
    /// Apply `f` to every present link.
    pub fn map_present(self, f: impl Fn(String) -> String) -> Self {
        Links {
            detail: self.detail.map(&f),
            history: self.history.map(&f),
            video: self.video.map(&f),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    #[serde(rename = "name")]
    pub game: GameKind,
    /// UTC capture day, kept for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub period: u64,
    /// Absent for games without a prize pool (fc3d).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_amount: Option<u64>,
    #[serde(default)]
    pub numbers: Vec<u32>,
    #[serde(default)]
    pub links: Links,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl DrawRecord {
    pub fn new(game: GameKind, period: u64, observed_at: DateTime<Utc>) -> Self {
        Self {
            game,
            date: Some(observed_at.date_naive()),
            period,
            pool_amount: None,
            numbers: Vec::new(),
            links: Links::default(),
            observed_at: Some(observed_at),
        }
    }

    /// When this observation was made. Records from older archives only carry
    /// the capture day, which counts as midnight UTC.
    pub fn recency(&self) -> Option<DateTime<Utc>> {
        self.observed_at
            .or_else(|| self.date.and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc()))
    }

    /// Same announced draw, ignoring when and on which day it was observed.
    pub fn same_draw(&self, other: &DrawRecord) -> bool {
        self.game == other.game
            && self.period == other.period
            && self.pool_amount == other.pool_amount
            && self.numbers == other.numbers
            && self.links == other.links
    }
}

/// Records from one scrape pass, keyed by game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub observed_at: DateTime<Utc>,
    #[serde(flatten)]
    records: BTreeMap<GameKind, DrawRecord>,
}

impl Snapshot {
    pub fn new(observed_at: DateTime<Utc>) -> Self {
        Self { observed_at, records: BTreeMap::new() }
    }

    /// Later inserts for the same game replace earlier ones.
    pub fn insert(&mut self, record: DrawRecord) -> Option<DrawRecord> {
        self.records.insert(record.game, record)
    }

    pub fn get(&self, game: GameKind) -> Option<&DrawRecord> {
        self.records.get(&game)
    }

    pub fn contains(&self, game: GameKind) -> bool {
        self.records.contains_key(&game)
    }

    pub fn games(&self) -> impl Iterator<Item = GameKind> + '_ {
        self.records.keys().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = &DrawRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
