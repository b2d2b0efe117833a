// tripmerge - merge duplicate passenger-flight records from delimited exports

mod exit_codes;
mod merge;

use std::io::IsTerminal;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tripmerge_dedup::DedupError;

use exit_codes::{dedup_exit_code, EXIT_DEDUP_IO, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};
use merge::{CheckArgs, MergeArgs};

#[derive(Parser)]
#[command(name = "tripmerge")]
#[command(about = "Merge duplicate passenger-flight records into one row per trip")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log pipeline progress to stderr (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster duplicate records across one or more files and write one row per cluster
    #[command(after_help = "\
Inputs are concatenated in argument order; `-` reads stdin.
Output has the 20 canonical columns in fixed order.

Examples:
  tripmerge merge export_a.csv export_b.csv -o merged.csv
  tripmerge merge export.csv --sep , --out-sep ';' > merged.csv
  tripmerge merge export.csv -o merged.csv --report report.json
  tripmerge merge export.csv -o merged.csv --json | jq .summary
  tripmerge merge big.csv -o merged.csv --bucket-max 500 --window 16
  tripmerge merge export.csv -o merged.csv --config tripmerge.toml")]
    Merge(MergeArgs),

    /// Validate headers and config without clustering
    #[command(after_help = "\
Examples:
  tripmerge check export_a.csv export_b.csv
  tripmerge check export.csv --config tripmerge.toml")]
    Check(CheckArgs),
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  tripmerge-dedup ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Merge(args) => merge::cmd_merge(args),
        Commands::Check(args) => merge::cmd_check(args),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_DEDUP_IO, message: msg.into(), hint: None }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with its registry exit code.
    pub fn dedup(err: DedupError) -> Self {
        let code = dedup_exit_code(&err);
        let hint = match &err {
            DedupError::Schema { .. } => Some(
                "check the delimiter (--sep) or map source headers to canonical names under [aliases] in --config"
                    .to_string(),
            ),
            DedupError::ConfigParse(_) => {
                Some("known tables are [blocking], [input], [output] and [aliases]".to_string())
            }
            DedupError::ConfigValidation(_) => {
                Some("bucket_max and window must be positive; delimiters are one character".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
