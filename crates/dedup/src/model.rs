use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Fields
// ---------------------------------------------------------------------------

pub const FIELD_COUNT: usize = 20;

/// One column of the passenger-flight schema.
///
/// Declaration order is the canonical column order of both input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RealFirstName,
    RealLastName,
    BirthDate,
    FlightDate,
    FlightTime,
    FlightNo,
    Codeshare,
    DepCity,
    DepAirport,
    ArrCity,
    ArrAirport,
    ECode,
    ETicket,
    Docs,
    Seat,
    Meal,
    BookingClass,
    FareBasis,
    Baggage,
    LoyaltyPairs,
}

impl Field {
    pub const ALL: [Field; FIELD_COUNT] = [
        Self::RealFirstName,
        Self::RealLastName,
        Self::BirthDate,
        Self::FlightDate,
        Self::FlightTime,
        Self::FlightNo,
        Self::Codeshare,
        Self::DepCity,
        Self::DepAirport,
        Self::ArrCity,
        Self::ArrAirport,
        Self::ECode,
        Self::ETicket,
        Self::Docs,
        Self::Seat,
        Self::Meal,
        Self::BookingClass,
        Self::FareBasis,
        Self::Baggage,
        Self::LoyaltyPairs,
    ];

    /// Scalar fields compared with wildcard equality when deciding whether
    /// two observations belong to the same passenger.
    pub const PASSENGER: [Field; 7] = [
        Self::RealFirstName,
        Self::RealLastName,
        Self::BirthDate,
        Self::Docs,
        Self::ECode,
        Self::ETicket,
        Self::FareBasis,
    ];

    /// Fields identifying one flight leg.
    pub const FLIGHT: [Field; 6] = [
        Self::FlightDate,
        Self::FlightTime,
        Self::DepAirport,
        Self::ArrAirport,
        Self::FlightNo,
        Self::BookingClass,
    ];

    /// Position in [`Field::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical column name.
    pub fn name(self) -> &'static str {
        match self {
            Self::RealFirstName => "real_first_name",
            Self::RealLastName => "real_last_name",
            Self::BirthDate => "birth_date",
            Self::FlightDate => "flight_date",
            Self::FlightTime => "flight_time",
            Self::FlightNo => "flight_no",
            Self::Codeshare => "codeshare",
            Self::DepCity => "dep_city",
            Self::DepAirport => "dep_airport",
            Self::ArrCity => "arr_city",
            Self::ArrAirport => "arr_airport",
            Self::ECode => "e_code",
            Self::ETicket => "e_ticket",
            Self::Docs => "docs",
            Self::Seat => "seat",
            Self::Meal => "meal",
            Self::BookingClass => "booking_class",
            Self::FareBasis => "fare_basis",
            Self::Baggage => "baggage",
            Self::LoyaltyPairs => "loyalty_pairs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One passenger-flight observation. Empty string means "unknown".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [String; FIELD_COUNT],
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from values in canonical column order. Short input is padded
    /// with empty values; extra values are ignored.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut record = Self::default();
        for (slot, value) in record.values.iter_mut().zip(values) {
            *slot = value.into();
        }
        record
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Values in canonical column order.
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// Input records in load order. The position of a record is its identity
/// for the duration of one run.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> &Record {
        &self.records[index]
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Record)> {
        self.records.iter().enumerate()
    }
}

impl FromIterator<Record> for RecordStore {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Pairs + clusters
// ---------------------------------------------------------------------------

/// Unordered pair of record indices, stored as `(lo, hi)` with `lo < hi`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidatePair {
    pub lo: usize,
    pub hi: usize,
}

impl CandidatePair {
    /// Canonicalize `(a, b)`. Returns `None` for a self-pair.
    pub fn new(a: usize, b: usize) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { lo: a, hi: b }),
            std::cmp::Ordering::Greater => Some(Self { lo: b, hi: a }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// One connected component of accepted candidate pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    /// Member record indices, ascending.
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn min_member(&self) -> Option<usize> {
        self.members.first().copied()
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupSummary {
    pub input_records: usize,
    pub candidate_pairs: usize,
    pub checked_pairs: usize,
    pub accepted_pairs: usize,
    pub output_records: usize,
    pub merged_clusters: usize,
    pub largest_cluster: usize,
    pub windowed_blocks: usize,
    /// Blocks with at least two members, per scheme name.
    pub blocks_per_scheme: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupMeta {
    pub engine_version: String,
    pub run_at: String,
    pub bucket_max: usize,
    pub window: usize,
    pub schemes: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DedupResult {
    pub meta: DedupMeta,
    pub summary: DedupSummary,
    /// Output row `i` is the merge of `clusters[i]`.
    pub clusters: Vec<Cluster>,
    #[serde(skip)]
    pub records: Vec<Record>,
}
