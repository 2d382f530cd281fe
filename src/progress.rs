// src/progress.rs
/// Progress reporting for a run. Frontends implement this to surface status.
pub trait Progress {
    /// Called at the start with the number of games that will be examined.
    fn begin(&mut self, _total: usize) {}

    /// A game produced a record for `period`.
    fn game_done(&mut self, _game: crate::data::GameKind, _period: u64) {}

    /// A game produced nothing (no block, or rejected block).
    fn game_skipped(&mut self, _game: crate::data::GameKind, _reason: &str) {}

    /// Called once at the end of a run, successful or not.
    fn finish(&mut self) {}
}
