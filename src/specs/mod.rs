// src/specs/mod.rs
//! # Notice-page scraping specs
//!
//! The draw-notice page (`/ygkj/kjgg/`) shows one `div.notice-item` block per game.
//! The blocks share one layout and differ only in a handful of class names and
//! link paths, so each game is described by a row in [`GAMES`] and read by the
//! single generic [`notice::RecordBuilder`].
//!
//! ## Shared layout
//! ```text
//! div.notice-item.<game>
//!   .stage                 "第2024100期"           -> period
//!   .red                   "¥500,000,000元"        -> poolAmount (games with a pool)
//!   .qiu .lotteryNum       "01" "07" ...           -> numbers, document order
//!   .<x>XqLink[href]                               -> links.detail
//!   a[href*="/ygkj/wqkjgg/<game>/"]                -> links.history
//!   .<x>SpLink[href]                               -> links.video (games with a video)
//! ```
//!
//! ## What does **not** live here
//! - Fetching (`core::net`), merging and persistence (`store`).
//!
//! ## Testing notes
//! - Builders run offline against captured HTML (see `tests/fixtures`).

pub mod notice;

use crate::data::GameKind;

pub const STAGE: &str = ".stage";
pub const POOL: &str = ".red";
pub const NUMBERS: &str = ".qiu .lotteryNum";

/// Per-game selectors and field presence.
#[derive(Debug)]
pub struct GameSpec {
    pub game: GameKind,
    /// Root block. May be a selector group.
    pub root: &'static str,
    pub detail: &'static str,
    /// Path fragment that identifies this game's history page link.
    pub history_path: &'static str,
    pub video: Option<&'static str>,
    pub has_pool: bool,
}

impl GameSpec {
    pub fn history_selector(&self) -> String {
        format!(r#"a[href*="{}"]"#, self.history_path)
    }
}

pub static GAMES: [GameSpec; 4] = [
    GameSpec {
        game: GameKind::Ssq,
        root: ".notice-item.ssq",
        detail: ".ssqXqLink",
        history_path: "/ygkj/wqkjgg/ssq/",
        video: Some(".ssqSpLink"),
        has_pool: true,
    },
    GameSpec {
        game: GameKind::Kl8,
        root: ".notice-item.kl8",
        detail: ".kl8XqLink",
        history_path: "/ygkj/wqkjgg/kl8/",
        video: Some(".kl8SpLink"),
        has_pool: true,
    },
    GameSpec {
        game: GameKind::Fc3d,
        root: ".notice-item.fc3d",
        detail: ".fcXqLink",
        history_path: "/ygkj/wqkjgg/fc3d/",
        video: None,
        has_pool: false,
    },
    GameSpec {
        game: GameKind::Qlc,
        // live markup spells the block class "qcl"
        root: ".notice-item.qcl, .notice-item.qlc",
        detail: ".qlcXqLink",
        history_path: "/ygkj/wqkjgg/qlc/",
        video: Some(".qlcSpLink"),
        has_pool: true,
    },
];

pub fn spec_for(game: GameKind) -> &'static GameSpec {
    match game {
        GameKind::Ssq => &GAMES[0],
        GameKind::Kl8 => &GAMES[1],
        GameKind::Fc3d => &GAMES[2],
        GameKind::Qlc => &GAMES[3],
    }
}
