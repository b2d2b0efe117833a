//! Candidate pair generation.
//!
//! Blocks up to `bucket_max` members are compared exhaustively. Larger
//! blocks are sorted by an identity key and only members within `window`
//! positions of each other are paired (sorted-neighborhood method), which
//! bounds a block of `k` members to at most `k * window` pairs.
//!
//! Recall bound: two true duplicates become a candidate pair only if they
//! share a non-empty key in some scheme AND, in that block, either the block
//! has at most `bucket_max` members or they sort within `window` positions of
//! each other. Duplicates that share no exact key in any scheme (a reissued
//! ticket with a new booking code and no common loyalty token, say) are never
//! compared.

use std::collections::BTreeSet;

use crate::blocking::BlockIndex;
use crate::model::{CandidatePair, Field, RecordStore};

/// Sort order for windowed blocks.
const SORT_FIELDS: [Field; 7] = [
    Field::RealLastName,
    Field::RealFirstName,
    Field::BirthDate,
    Field::Docs,
    Field::ETicket,
    Field::ECode,
    Field::FareBasis,
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateStats {
    pub exhaustive_blocks: usize,
    pub windowed_blocks: usize,
    /// Pairs emitted before cross-block deduplication.
    pub raw_pairs: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub pairs: BTreeSet<CandidatePair>,
    pub stats: CandidateStats,
}

impl CandidateSet {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    fn insert(&mut self, a: usize, b: usize) {
        if let Some(pair) = CandidatePair::new(a, b) {
            self.stats.raw_pairs += 1;
            self.pairs.insert(pair);
        }
    }
}

/// Union of the per-block pairs of every index.
pub fn generate_candidate_pairs(
    store: &RecordStore,
    indexes: &[BlockIndex<'_>],
    bucket_max: usize,
    window: usize,
) -> CandidateSet {
    let mut out = CandidateSet::default();
    for index in indexes {
        for members in index.pairable_blocks() {
            add_block_pairs(store, members, bucket_max, window, &mut out);
        }
    }
    out
}

/// Pairs contributed by one block.
pub fn add_block_pairs(
    store: &RecordStore,
    members: &[usize],
    bucket_max: usize,
    window: usize,
    out: &mut CandidateSet,
) {
    if members.len() <= 1 {
        return;
    }

    if members.len() <= bucket_max {
        out.stats.exhaustive_blocks += 1;
        for (pos, &a) in members.iter().enumerate() {
            for &b in &members[pos + 1..] {
                out.insert(a, b);
            }
        }
        return;
    }

    out.stats.windowed_blocks += 1;
    let sorted = sort_by_identity(store, members);
    for (pos, &a) in sorted.iter().enumerate() {
        let end = sorted.len().min(pos.saturating_add(window).saturating_add(1));
        for &b in &sorted[pos + 1..end] {
            out.insert(a, b);
        }
    }
}

/// Members ordered by the identity sort key, ties broken by record index.
fn sort_by_identity(store: &RecordStore, members: &[usize]) -> Vec<usize> {
    let mut keyed: Vec<([&str; 7], usize)> = members
        .iter()
        .map(|&i| {
            let record = store.get(i);
            (SORT_FIELDS.map(|f| record.get(f).trim()), i)
        })
        .collect();
    keyed.sort_unstable();
    keyed.into_iter().map(|(_, i)| i).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocking::{build_blocks, BlockingScheme};
    use crate::model::Record;

    fn on_flight(last: &str) -> Record {
        Record::new()
            .with(Field::FlightDate, "2023-05-01")
            .with(Field::FlightNo, "LH400")
            .with(Field::DepAirport, "FRA")
            .with(Field::ArrAirport, "JFK")
            .with(Field::RealLastName, last)
    }

    #[test]
    fn small_block_is_exhaustive() {
        let store: RecordStore = ["A", "B", "C", "D"].into_iter().map(on_flight).collect();
        let indexes = build_blocks(&store, &[BlockingScheme::FlightRoute]);
        let set = generate_candidate_pairs(&store, &indexes, 200, 8);
        assert_eq!(set.len(), 6);
        assert_eq!(set.stats.exhaustive_blocks, 1);
        assert_eq!(set.stats.windowed_blocks, 0);
    }

    #[test]
    fn large_block_uses_window() {
        let store: RecordStore = (0..10).map(|i| on_flight(&format!("N{i:02}"))).collect();
        let indexes = build_blocks(&store, &[BlockingScheme::FlightRoute]);
        let set = generate_candidate_pairs(&store, &indexes, 5, 2);
        // 8 members get two forward neighbours, the second to last one, the last none.
        assert_eq!(set.len(), 8 * 2 + 1);
        assert_eq!(set.stats.windowed_blocks, 1);
        assert!(set.pairs.contains(&CandidatePair { lo: 0, hi: 2 }));
        assert!(!set.pairs.contains(&CandidatePair { lo: 0, hi: 3 }));
    }

    #[test]
    fn window_follows_identity_order_not_input_order() {
        // Input order Z, A, Y, B; sorted: A(1), B(3), Y(2), Z(0).
        let store: RecordStore = ["Z", "A", "Y", "B"].into_iter().map(on_flight).collect();
        let indexes = build_blocks(&store, &[BlockingScheme::FlightRoute]);
        let set = generate_candidate_pairs(&store, &indexes, 3, 1);
        let pairs: Vec<(usize, usize)> = set.pairs.iter().map(|p| (p.lo, p.hi)).collect();
        assert_eq!(pairs, vec![(0, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn pairs_deduplicated_across_schemes() {
        let store = RecordStore::new(vec![
            on_flight("A").with(Field::ETicket, "111").with(Field::Docs, "P1"),
            on_flight("A").with(Field::ETicket, "111").with(Field::Docs, "P1"),
        ]);
        let indexes = build_blocks(&store, &BlockingScheme::ALL);
        let set = generate_candidate_pairs(&store, &indexes, 200, 8);
        assert_eq!(set.len(), 1);
        assert_eq!(set.stats.raw_pairs, 3);
    }

    #[test]
    fn unbounded_window_degrades_to_exhaustive() {
        let store = RecordStore::new(vec![
            Record::new().with(Field::ETicket, "111").with(Field::RealLastName, "A"),
            Record::new().with(Field::ETicket, "111").with(Field::RealLastName, "B"),
            Record::new().with(Field::ETicket, "111").with(Field::RealLastName, "C"),
        ]);
        let indexes = build_blocks(&store, &[BlockingScheme::Ticket]);
        let set = generate_candidate_pairs(&store, &indexes, 1, usize::MAX);
        assert_eq!(set.stats.windowed_blocks, 1);
        assert_eq!(set.len(), 3 * 2 / 2);
    }

    #[test]
    fn singleton_and_empty_blocks_contribute_nothing() {
        let store = RecordStore::new(vec![on_flight("A")]);
        let mut out = CandidateSet::default();
        add_block_pairs(&store, &[], 200, 8, &mut out);
        add_block_pairs(&store, &[0], 200, 8, &mut out);
        assert!(out.is_empty());
        assert_eq!(out.stats, CandidateStats::default());
    }
}
