//! `tripmerge-dedup`: passenger-flight record linkage engine.
//!
//! Pure engine crate: receives a record store, returns one merged record per
//! cluster of duplicate observations. Besides the CSV boundary helpers in
//! [`engine`], no CLI or file IO.
//!
//! Pipeline: blocking indexes → candidate pairs → duplicate predicate →
//! union-find → per-cluster merge.

pub mod aggregate;
pub mod blocking;
pub mod candidates;
pub mod classify;
pub mod config;
pub mod dsu;
pub mod engine;
pub mod error;
pub mod loyalty;
pub mod model;
pub mod schema;

pub use blocking::BlockingScheme;
pub use config::DedupConfig;
pub use engine::{
    check_output_delimiter, load_csv_records, run, run_with_cancel, write_csv_records,
};
pub use error::DedupError;
pub use model::{Cluster, DedupResult, Field, Record, RecordStore};
