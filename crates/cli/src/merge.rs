//! `tripmerge merge` and `tripmerge check`.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use tripmerge_dedup::{
    check_output_delimiter, load_csv_records, run, write_csv_records, DedupConfig, DedupResult,
    Record, RecordStore,
};

use crate::CliError;

/// Path argument that reads stdin instead of a file.
const STDIN_PATH: &str = "-";

#[derive(Args)]
pub struct InputArgs {
    /// Input files with a header row (`-` for stdin)
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Input delimiter, one character (`\t` for tab). Default `;`
    #[arg(long, value_name = "CHAR")]
    pub sep: Option<String>,

    /// TOML config with [blocking], [input], [output] and [aliases] tables
    #[arg(long, env = "TRIPMERGE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct MergeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output delimiter, one character, absent from the data. Default `;`
    #[arg(long, value_name = "CHAR")]
    pub out_sep: Option<String>,

    /// Blocks up to this size are compared pairwise; larger ones use the window
    #[arg(long, value_name = "N")]
    pub bucket_max: Option<usize>,

    /// Sorted-neighborhood width for blocks larger than --bucket-max
    #[arg(long, value_name = "N")]
    pub window: Option<usize>,

    /// Print the JSON run report to stdout (requires --output)
    #[arg(long)]
    pub json: bool,

    /// Write the JSON run report to a file
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Records loaded from one input.
struct LoadedInput {
    name: String,
    records: Vec<Record>,
}

// ============================================================================
// merge
// ============================================================================

pub fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    if args.json && args.output.is_none() {
        return Err(CliError::usage("--json needs --output; stdout already carries the merged rows")
            .with_hint("add -o merged.csv, or use --report report.json"));
    }

    let mut config = resolve_config(&args.input)?;
    if let Some(sep) = args.out_sep {
        config.output.delimiter = sep;
    }
    if let Some(bucket_max) = args.bucket_max {
        config.blocking.bucket_max = bucket_max;
    }
    if let Some(window) = args.window {
        config.blocking.window = window;
    }
    config.validate().map_err(CliError::dedup)?;
    let out_delimiter = config.output_delimiter().map_err(CliError::dedup)?;

    let loaded = load_inputs(&args.input.inputs, &config)?;
    let store: RecordStore = loaded.into_iter().flat_map(|input| input.records).collect();

    let result = run(&config, &store).map_err(CliError::dedup)?;
    check_output_delimiter(&result.records, out_delimiter).map_err(|e| {
        CliError::dedup(e).with_hint("output is never quoted; pick an --out-sep absent from the data")
    })?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
            write_csv_records(BufWriter::new(file), &result.records, out_delimiter)
                .map_err(CliError::dedup)?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            write_csv_records(stdout.lock(), &result.records, out_delimiter)
                .map_err(CliError::dedup)?;
        }
    }

    if args.json || args.report.is_some() {
        write_report(&result, args.json, args.report.as_deref())?;
    }

    print_summary(&result);
    Ok(())
}

fn write_report(
    result: &DedupResult,
    to_stdout: bool,
    path: Option<&Path>,
) -> Result<(), CliError> {
    let json_str = serde_json::to_string_pretty(result)
        .map_err(|e| CliError::internal(format!("JSON serialization error: {e}")))?;

    if let Some(path) = path {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::io(format!("cannot write report: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if to_stdout {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{json_str}").map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

/// Human summary to stderr.
fn print_summary(result: &DedupResult) {
    let s = &result.summary;
    eprintln!(
        "merged {} rows into {}: {} clusters of 2+ (largest {}), {} of {} candidate pairs accepted",
        s.input_records,
        s.output_records,
        s.merged_clusters,
        s.largest_cluster,
        s.accepted_pairs,
        s.candidate_pairs,
    );
    if s.windowed_blocks > 0 {
        eprintln!(
            "note: {} block(s) over bucket_max {} compared within window {}",
            s.windowed_blocks, result.meta.bucket_max, result.meta.window,
        );
    }
}

// ============================================================================
// check
// ============================================================================

pub fn cmd_check(args: CheckArgs) -> Result<(), CliError> {
    let config = resolve_config(&args.input)?;
    config.validate().map_err(CliError::dedup)?;

    let loaded = load_inputs(&args.input.inputs, &config)?;
    let mut total = 0;
    for input in &loaded {
        eprintln!("{}: {} rows", input.name, input.records.len());
        total += input.records.len();
    }
    eprintln!("valid: {} input(s), {} rows", loaded.len(), total);
    Ok(())
}

// ============================================================================
// Shared input handling
// ============================================================================

fn resolve_config(input: &InputArgs) -> Result<DedupConfig, CliError> {
    let mut config = match &input.config {
        Some(path) => {
            let config_str = std::fs::read_to_string(path).map_err(|e| {
                CliError::io(format!("cannot read config {}: {e}", path.display()))
            })?;
            log::info!("using config {}", path.display());
            DedupConfig::from_toml(&config_str).map_err(CliError::dedup)?
        }
        None => DedupConfig::default(),
    };
    if let Some(sep) = &input.sep {
        config.input.delimiter = sep.clone();
    }
    Ok(config)
}

/// Read and parse every input in argument order. A schema error on any input
/// aborts before clustering starts.
fn load_inputs(paths: &[String], config: &DedupConfig) -> Result<Vec<LoadedInput>, CliError> {
    if paths.iter().filter(|p| p.as_str() == STDIN_PATH).count() > 1 {
        return Err(CliError::usage("stdin (-) can only be given once"));
    }

    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        let (name, data) = read_input(path)?;
        let records = load_csv_records(&name, &data, config).map_err(CliError::dedup)?;
        log::info!("{name}: {} rows", records.len());
        loaded.push(LoadedInput { name, records });
    }
    Ok(loaded)
}

fn read_input(path: &str) -> Result<(String, String), CliError> {
    if path == STDIN_PATH {
        let mut data = String::new();
        io::stdin()
            .read_to_string(&mut data)
            .map_err(|e| CliError::io(format!("cannot read stdin: {e}")))?;
        return Ok(("<stdin>".to_string(), data));
    }
    let data = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {path}: {e}")))?;
    Ok((path.to_string(), data))
}
