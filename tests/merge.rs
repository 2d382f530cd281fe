// tests/merge.rs
//
// Archive merge: last-write-wins by (game, period), dedup + descending order.
//
use chrono::{DateTime, TimeZone, Utc};

use cwl_scrape::data::{DrawRecord, GameKind, Snapshot};
use cwl_scrape::store::{Archive, MergeReport};

fn t(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
}

fn rec(game: GameKind, period: u64, hour: u32, numbers: &[u32]) -> DrawRecord {
    let mut r = DrawRecord::new(game, period, t(hour));
    r.numbers = numbers.to_vec();
    if game != GameKind::Fc3d {
        r.pool_amount = Some(1000);
    }
    r
}

fn snapshot(hour: u32, records: Vec<DrawRecord>) -> Snapshot {
    let mut s = Snapshot::new(t(hour));
    for r in records {
        s.insert(r);
    }
    s
}

fn assert_invariants(a: &Archive) {
    for game in GameKind::ALL {
        let periods: Vec<u64> = a.records(game).iter().map(|r| r.period).collect();
        assert!(
            periods.windows(2).all(|w| w[0] > w[1]),
            "{game}: periods not strictly descending: {periods:?}"
        );
        assert!(a.records(game).iter().all(|r| r.game == game));
    }
}

#[test]
fn new_periods_are_added_and_sorted() {
    let base = Archive::from_lists([(
        GameKind::Ssq,
        vec![rec(GameKind::Ssq, 98, 1, &[1]), rec(GameKind::Ssq, 100, 1, &[2])],
    )]);
    let snap = snapshot(2, vec![rec(GameKind::Ssq, 99, 2, &[3]), rec(GameKind::Kl8, 5, 2, &[4])]);

    let mut merged = base.clone();
    let report = merged.merge_in(&snap);

    assert_eq!(report, MergeReport { added: 2, ..Default::default() });
    let ssq: Vec<u64> = merged.records(GameKind::Ssq).iter().map(|r| r.period).collect();
    assert_eq!(ssq, vec![100, 99, 98]);
    assert_eq!(merged.records(GameKind::Kl8).len(), 1);
    assert!(merged.records(GameKind::Fc3d).is_empty());
    assert_invariants(&merged);
}

#[test]
fn later_observation_replaces_earlier() {
    let base = Archive::from_lists([(GameKind::Ssq, vec![rec(GameKind::Ssq, 100, 1, &[1, 2, 3])])]);
    let newer = rec(GameKind::Ssq, 100, 2, &[4, 5, 6]);

    let mut merged = base.clone();
    let report = merged.merge_in(&snapshot(2, vec![newer.clone()]));

    assert_eq!(report.replaced, 1);
    assert_eq!(merged.records(GameKind::Ssq), &[newer]);
}

#[test]
fn reobserving_same_draw_is_unchanged() {
    let base = Archive::from_lists([(GameKind::Ssq, vec![rec(GameKind::Ssq, 100, 1, &[1, 2, 3])])]);
    let again = rec(GameKind::Ssq, 100, 2, &[1, 2, 3]);

    let mut merged = base.clone();
    let report = merged.merge_in(&snapshot(2, vec![again.clone()]));

    assert_eq!(report, MergeReport { unchanged: 1, ..Default::default() });
    // the newer observation time is still kept
    assert_eq!(merged.records(GameKind::Ssq), &[again]);
}

#[test]
fn older_observation_does_not_replace_newer() {
    let kept = rec(GameKind::Qlc, 100, 5, &[9]);
    let base = Archive::from_lists([(GameKind::Qlc, vec![kept.clone()])]);

    let mut merged = base.clone();
    let report = merged.merge_in(&snapshot(1, vec![rec(GameKind::Qlc, 100, 1, &[1])]));

    assert_eq!(report.stale, 1);
    assert_eq!(merged.records(GameKind::Qlc), &[kept]);
}

#[test]
fn equal_or_unknown_time_prefers_incoming() {
    let base = Archive::from_lists([(GameKind::Kl8, vec![rec(GameKind::Kl8, 7, 3, &[1])])]);
    let same_time = rec(GameKind::Kl8, 7, 3, &[2]);
    let merged = base.merge(&snapshot(3, vec![same_time.clone()]));
    assert_eq!(merged.records(GameKind::Kl8), &[same_time]);

    let mut legacy = rec(GameKind::Kl8, 7, 9, &[5]);
    legacy.observed_at = None;
    legacy.date = None;
    let base = Archive::from_lists([(GameKind::Kl8, vec![legacy])]);
    let incoming = rec(GameKind::Kl8, 7, 1, &[6]);
    let merged = base.merge(&snapshot(1, vec![incoming.clone()]));
    assert_eq!(merged.records(GameKind::Kl8), &[incoming]);
}

#[test]
fn merge_is_idempotent() {
    let base = Archive::from_lists([
        (GameKind::Ssq, vec![rec(GameKind::Ssq, 10, 1, &[1]), rec(GameKind::Ssq, 11, 1, &[2])]),
        (GameKind::Fc3d, vec![rec(GameKind::Fc3d, 3, 1, &[7, 0, 4])]),
    ]);
    let snap = snapshot(2, vec![rec(GameKind::Ssq, 11, 2, &[9]), rec(GameKind::Fc3d, 4, 2, &[1, 1, 1])]);

    let once = base.merge(&snap);
    let mut twice = once.clone();
    let report = twice.merge_in(&snap);

    assert_eq!(once, twice);
    assert_eq!(report, MergeReport { unchanged: 2, ..Default::default() });
}

#[test]
fn merge_order_does_not_matter_for_distinct_periods() {
    let base = Archive::from_lists([(GameKind::Ssq, vec![rec(GameKind::Ssq, 1, 1, &[1])])]);
    let a = snapshot(2, vec![rec(GameKind::Ssq, 2, 2, &[2]), rec(GameKind::Kl8, 20, 2, &[2])]);
    let b = snapshot(3, vec![rec(GameKind::Ssq, 3, 3, &[3]), rec(GameKind::Qlc, 30, 3, &[3])]);

    let ab = base.merge(&a).merge(&b);
    let ba = base.merge(&b).merge(&a);

    assert_eq!(ab, ba);
    assert_eq!(ab.total(), 5);
    assert_invariants(&ab);
}

#[test]
fn recency_decides_regardless_of_merge_order() {
    let early = snapshot(1, vec![rec(GameKind::Ssq, 100, 1, &[1])]);
    let late = snapshot(2, vec![rec(GameKind::Ssq, 100, 2, &[2])]);

    let a = Archive::empty().merge(&early).merge(&late);
    let b = Archive::empty().merge(&late).merge(&early);

    assert_eq!(a, b);
    assert_eq!(a.records(GameKind::Ssq)[0].numbers, vec![2]);
}

#[test]
fn dirty_lists_are_repaired_on_merge() {
    // duplicated + ascending, as a hand-edited file might be
    let base = Archive::from_lists([(
        GameKind::Fc3d,
        vec![
            rec(GameKind::Fc3d, 1, 1, &[0]),
            rec(GameKind::Fc3d, 2, 1, &[0]),
            rec(GameKind::Fc3d, 2, 4, &[9]),
            rec(GameKind::Fc3d, 3, 1, &[0]),
        ],
    )]);
    let merged = base.merge(&Snapshot::new(t(5)));

    let fc3d = merged.records(GameKind::Fc3d);
    assert_eq!(fc3d.iter().map(|r| r.period).collect::<Vec<_>>(), vec![3, 2, 1]);
    assert_eq!(fc3d[1].numbers, vec![9], "newer duplicate wins");
    assert_invariants(&merged);
}
