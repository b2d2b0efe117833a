use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::aggregate::aggregate_cluster;
use crate::blocking::build_blocks;
use crate::candidates::generate_candidate_pairs;
use crate::classify::is_duplicate;
use crate::config::DedupConfig;
use crate::dsu::DisjointSet;
use crate::error::DedupError;
use crate::model::{DedupMeta, DedupResult, DedupSummary, Field, Record, RecordStore};
use crate::schema::{ColumnMap, HeaderResolver};

/// Delimiters tried when the configured one cannot resolve the header.
const SNIFF_DELIMITERS: [u8; 4] = [b';', b',', b'\t', b'|'];

/// Cluster the store and merge every cluster into one record.
pub fn run(config: &DedupConfig, store: &RecordStore) -> Result<DedupResult, DedupError> {
    run_with_cancel(config, store, &AtomicBool::new(false))
}

/// Same as [`run`], checking `cancel` between stages. A stage that has
/// started always completes; in particular unions are never interrupted.
pub fn run_with_cancel(
    config: &DedupConfig,
    store: &RecordStore,
    cancel: &AtomicBool,
) -> Result<DedupResult, DedupError> {
    config.validate()?;
    let blocking = &config.blocking;
    let checkpoint = || {
        if cancel.load(Ordering::Relaxed) {
            Err(DedupError::Cancelled)
        } else {
            Ok(())
        }
    };

    log::info!("loaded rows: {}", store.len());
    checkpoint()?;

    let indexes = build_blocks(store, &blocking.schemes);
    checkpoint()?;

    let candidates =
        generate_candidate_pairs(store, &indexes, blocking.bucket_max, blocking.window);
    log::info!("pairs to check: {}", candidates.len());
    checkpoint()?;

    // Classification is pure; collect verdicts first, then union sequentially.
    let accepted: Vec<_> = candidates
        .pairs
        .iter()
        .filter(|p| is_duplicate(store.get(p.lo), store.get(p.hi)))
        .copied()
        .collect();
    log::info!(
        "checked pairs: {}, merged pairs: {}",
        candidates.len(),
        accepted.len()
    );
    checkpoint()?;

    let mut dsu = DisjointSet::new(store.len());
    for pair in &accepted {
        dsu.union(pair.lo, pair.hi);
    }
    log::debug!("disjoint sets after union: {}", dsu.set_count());
    let clusters = dsu.clusters();
    checkpoint()?;

    let records: Vec<Record> = clusters
        .iter()
        .map(|cluster| aggregate_cluster(store, cluster))
        .collect();
    log::info!("output rows: {}", records.len());

    let summary = DedupSummary {
        input_records: store.len(),
        candidate_pairs: candidates.len(),
        checked_pairs: candidates.len(),
        accepted_pairs: accepted.len(),
        output_records: records.len(),
        merged_clusters: clusters.iter().filter(|c| c.len() > 1).count(),
        largest_cluster: clusters.iter().map(|c| c.len()).max().unwrap_or(0),
        windowed_blocks: candidates.stats.windowed_blocks,
        blocks_per_scheme: indexes
            .iter()
            .map(|i| (i.scheme.name().to_string(), i.pairable_count()))
            .collect(),
    };

    Ok(DedupResult {
        meta: DedupMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            bucket_max: blocking.bucket_max,
            window: blocking.window,
            schemes: blocking.schemes.iter().map(|s| s.name().to_string()).collect(),
        },
        summary,
        clusters,
        records,
    })
}

// ---------------------------------------------------------------------------
// Delimited text boundary
// ---------------------------------------------------------------------------

/// Load records from delimited text, resolving headers to the 20-field schema.
///
/// Quotes are data, not syntax. Short rows are padded with empty values and
/// every value is trimmed. Columns absent from the header load as empty; if
/// more than half are absent the input is rejected.
pub fn load_csv_records(
    source: &str,
    data: &str,
    config: &DedupConfig,
) -> Result<Vec<Record>, DedupError> {
    let resolver = HeaderResolver::with_aliases(&config.aliases);
    let configured = config.input_delimiter()?;

    let mut delimiter = configured;
    let mut columns = resolve_header(source, data, configured, &resolver)?;
    if let Err(err) = columns.check(source) {
        if !config.input.autodetect_delimiter {
            return Err(err);
        }
        match detect_delimiter(source, data, &resolver)? {
            Some((sniffed, sniffed_columns)) if sniffed != configured => {
                log::info!(
                    "{source}: delimiter {:?} did not match the schema, using {:?}",
                    configured as char,
                    sniffed as char
                );
                sniffed_columns.check(source)?;
                delimiter = sniffed;
                columns = sniffed_columns;
            }
            _ => return Err(err),
        }
    }

    let missing = columns.missing();
    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.name()).collect();
        log::warn!("{source}: columns absent, loaded as empty: {}", names.join(", "));
    }

    let mut reader = reader_for(data, delimiter);
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| csv_error(source, e))?;
        records.push(Record::from_values(Field::ALL.iter().map(|&field| {
            columns
                .position(field)
                .and_then(|pos| row.get(pos))
                .unwrap_or("")
                .trim()
        })));
    }
    Ok(records)
}

/// Output is never quoted, so the delimiter must not occur in any header or
/// value. Row numbers in the error are 1-based data rows.
pub fn check_output_delimiter(records: &[Record], delimiter: u8) -> Result<(), DedupError> {
    let clash = |value: &str| value.as_bytes().contains(&delimiter);
    if let Some(field) = Field::ALL.iter().find(|f| clash(f.name())) {
        return Err(DedupError::ConfigValidation(format!(
            "output.delimiter {:?} occurs in column name {}",
            delimiter as char,
            field.name()
        )));
    }
    for (row, record) in records.iter().enumerate() {
        if let Some(field) = Field::ALL.iter().find(|&&f| clash(record.get(f))) {
            return Err(DedupError::ConfigValidation(format!(
                "output.delimiter {:?} occurs in {} of output row {}: {:?}",
                delimiter as char,
                field.name(),
                row + 1,
                record.get(*field)
            )));
        }
    }
    Ok(())
}

/// Write records with a header row in canonical column order. Fails before
/// writing anything if the delimiter occurs in the data.
pub fn write_csv_records<W: io::Write>(
    writer: W,
    records: &[Record],
    delimiter: u8,
) -> Result<(), DedupError> {
    check_output_delimiter(records, delimiter)?;
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    out.write_record(Field::ALL.iter().map(|f| f.name()))
        .map_err(|e| DedupError::Io(e.to_string()))?;
    for record in records {
        out.write_record(record.values())
            .map_err(|e| DedupError::Io(e.to_string()))?;
    }
    out.flush().map_err(|e| DedupError::Io(e.to_string()))
}

/// Pick the candidate delimiter whose header resolves the most fields.
pub fn detect_delimiter(
    source: &str,
    data: &str,
    resolver: &HeaderResolver,
) -> Result<Option<(u8, ColumnMap)>, DedupError> {
    let mut best: Option<(u8, ColumnMap)> = None;
    for delimiter in SNIFF_DELIMITERS {
        let columns = resolve_header(source, data, delimiter, resolver)?;
        let better = match &best {
            None => columns.resolved_count() > 0,
            Some((_, current)) => columns.resolved_count() > current.resolved_count(),
        };
        if better {
            best = Some((delimiter, columns));
        }
    }
    Ok(best)
}

fn resolve_header(
    source: &str,
    data: &str,
    delimiter: u8,
    resolver: &HeaderResolver,
) -> Result<ColumnMap, DedupError> {
    let mut reader = reader_for(data, delimiter);
    let headers = reader.headers().map_err(|e| csv_error(source, e))?;
    let names: Vec<&str> = headers.iter().collect();
    Ok(resolver.resolve(&names))
}

fn reader_for(data: &str, delimiter: u8) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .quoting(false)
        .flexible(true)
        .from_reader(data.as_bytes())
}

fn csv_error(source: &str, err: csv::Error) -> DedupError {
    DedupError::Csv {
        source: source.to_string(),
        message: err.to_string(),
    }
}
