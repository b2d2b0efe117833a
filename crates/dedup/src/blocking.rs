//! Blocking indexes.
//!
//! Each scheme partitions record indices by an exact composite key. A record
//! with an empty component in a scheme's key is left out of that scheme: an
//! empty field cannot anchor a match.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::loyalty::parse_tokens;
use crate::model::{Field, Record, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingScheme {
    /// (flight_date, flight_no, dep_airport, arr_airport)
    FlightRoute,
    /// (flight_date, flight_no, booking_class)
    FlightClass,
    /// e_ticket
    Ticket,
    /// e_code
    BookingCode,
    /// docs
    Document,
    /// One block per loyalty token.
    LoyaltyToken,
}

impl BlockingScheme {
    pub const ALL: [BlockingScheme; 6] = [
        Self::FlightRoute,
        Self::FlightClass,
        Self::Ticket,
        Self::BookingCode,
        Self::Document,
        Self::LoyaltyToken,
    ];

    /// Key fields for the single-key schemes. The loyalty scheme keys on
    /// individual tokens of `loyalty_pairs` instead.
    pub fn fields(self) -> &'static [Field] {
        match self {
            Self::FlightRoute => &[
                Field::FlightDate,
                Field::FlightNo,
                Field::DepAirport,
                Field::ArrAirport,
            ],
            Self::FlightClass => &[Field::FlightDate, Field::FlightNo, Field::BookingClass],
            Self::Ticket => &[Field::ETicket],
            Self::BookingCode => &[Field::ECode],
            Self::Document => &[Field::Docs],
            Self::LoyaltyToken => &[Field::LoyaltyPairs],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FlightRoute => "flight_route",
            Self::FlightClass => "flight_class",
            Self::Ticket => "ticket",
            Self::BookingCode => "booking_code",
            Self::Document => "document",
            Self::LoyaltyToken => "loyalty_token",
        }
    }

    /// Every block key this record contributes to. Empty when any key
    /// component is missing.
    pub fn keys<'a>(self, record: &'a Record) -> Vec<BlockKey<'a>> {
        if self == Self::LoyaltyToken {
            return parse_tokens(record.get(Field::LoyaltyPairs))
                .into_iter()
                .map(|token| vec![token])
                .collect();
        }

        let mut key = Vec::with_capacity(self.fields().len());
        for &f in self.fields() {
            let value = record.get(f).trim();
            if value.is_empty() {
                return Vec::new();
            }
            key.push(value);
        }
        vec![key]
    }
}

impl std::fmt::Display for BlockingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite key, all components non-empty.
pub type BlockKey<'a> = Vec<&'a str>;

/// One scheme's partition: key → ascending record indices.
#[derive(Debug, Clone)]
pub struct BlockIndex<'a> {
    pub scheme: BlockingScheme,
    pub blocks: BTreeMap<BlockKey<'a>, Vec<usize>>,
}

impl<'a> BlockIndex<'a> {
    /// Scan the store once and bucket every record with a complete key.
    pub fn build(scheme: BlockingScheme, store: &'a RecordStore) -> Self {
        let mut blocks: BTreeMap<BlockKey<'a>, Vec<usize>> = BTreeMap::new();
        for (i, record) in store.iter() {
            for key in scheme.keys(record) {
                blocks.entry(key).or_default().push(i);
            }
        }
        Self { scheme, blocks }
    }

    /// Blocks that can produce at least one pair.
    pub fn pairable_blocks(&self) -> impl Iterator<Item = &[usize]> {
        self.blocks
            .values()
            .filter(|members| members.len() > 1)
            .map(Vec::as_slice)
    }

    pub fn pairable_count(&self) -> usize {
        self.pairable_blocks().count()
    }
}

/// Build one index per scheme. Schemes only read the store, so order is irrelevant.
pub fn build_blocks<'a>(store: &'a RecordStore, schemes: &[BlockingScheme]) -> Vec<BlockIndex<'a>> {
    schemes
        .iter()
        .map(|&scheme| {
            let index = BlockIndex::build(scheme, store);
            log::debug!(
                "blocking scheme {scheme}: {} keys, {} pairable",
                index.blocks.len(),
                index.pairable_count()
            );
            index
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(date: &str, no: &str, dep: &str, arr: &str, class: &str) -> Record {
        Record::new()
            .with(Field::FlightDate, date)
            .with(Field::FlightNo, no)
            .with(Field::DepAirport, dep)
            .with(Field::ArrAirport, arr)
            .with(Field::BookingClass, class)
    }

    #[test]
    fn flight_route_groups_and_skips_incomplete() {
        let store = RecordStore::new(vec![
            rec("2023-05-01", "LH400", "FRA", "JFK", "Y"),
            rec("2023-05-01", "LH400", "FRA", "", "Y"),
            rec("2023-05-01", "LH400", "FRA", "JFK", ""),
            rec("2023-05-02", "LH400", "FRA", "JFK", "Y"),
        ]);
        let index = BlockIndex::build(BlockingScheme::FlightRoute, &store);
        assert_eq!(index.blocks.len(), 2);
        assert_eq!(index.blocks[&vec!["2023-05-01", "LH400", "FRA", "JFK"]], vec![0, 2]);
        assert_eq!(index.pairable_count(), 1);

        let by_class = BlockIndex::build(BlockingScheme::FlightClass, &store);
        assert_eq!(by_class.blocks[&vec!["2023-05-01", "LH400", "Y"]], vec![0, 1]);
    }

    #[test]
    fn single_field_schemes() {
        let store = RecordStore::new(vec![
            Record::new().with(Field::ETicket, "111").with(Field::ECode, "ABC"),
            Record::new().with(Field::ETicket, "111").with(Field::Docs, "P1"),
            Record::new().with(Field::ECode, "ABC").with(Field::Docs, "P1"),
        ]);
        let ticket = BlockIndex::build(BlockingScheme::Ticket, &store);
        assert_eq!(ticket.blocks[&vec!["111"]], vec![0, 1]);
        let code = BlockIndex::build(BlockingScheme::BookingCode, &store);
        assert_eq!(code.blocks[&vec!["ABC"]], vec![0, 2]);
        let docs = BlockIndex::build(BlockingScheme::Document, &store);
        assert_eq!(docs.blocks[&vec!["P1"]], vec![1, 2]);
    }

    #[test]
    fn loyalty_token_blocks_once_per_distinct_token() {
        let store = RecordStore::new(vec![
            Record::new().with(Field::LoyaltyPairs, "SU:1|LH:2|SU:1"),
            Record::new().with(Field::LoyaltyPairs, "LH:2"),
            Record::new(),
        ]);
        let index = BlockIndex::build(BlockingScheme::LoyaltyToken, &store);
        assert_eq!(index.blocks.len(), 2);
        assert_eq!(index.blocks[&vec!["SU:1"]], vec![0]);
        assert_eq!(index.blocks[&vec!["LH:2"]], vec![0, 1]);
    }

    #[test]
    fn build_all_schemes() {
        let store = RecordStore::new(vec![Record::new(), Record::new()]);
        let indexes = build_blocks(&store, &BlockingScheme::ALL);
        assert_eq!(indexes.len(), 6);
        assert!(indexes.iter().all(|i| i.blocks.is_empty()));
    }

    #[test]
    fn scheme_names_round_trip_through_serde() {
        for scheme in BlockingScheme::ALL {
            let json = serde_json::to_string(&scheme).unwrap();
            assert_eq!(json, format!("\"{}\"", scheme.name()));
        }
    }
}
