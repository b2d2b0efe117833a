use std::collections::HashMap;

use serde::Deserialize;

use crate::blocking::BlockingScheme;
use crate::error::DedupError;
use crate::model::Field;

pub const DEFAULT_BUCKET_MAX: usize = 200;
pub const DEFAULT_WINDOW: usize = 8;
pub const DEFAULT_DELIMITER: &str = ";";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DedupConfig {
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Extra header aliases: normalized header name → canonical field name.
    #[serde(default)]
    pub aliases: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Blocking
// ---------------------------------------------------------------------------

/// Candidate generation tunables. They trade recall for running time and
/// never change the duplicate predicate itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockingConfig {
    /// Blocks up to this size are compared exhaustively.
    #[serde(default = "default_bucket_max")]
    pub bucket_max: usize,
    /// Sorted-neighborhood width for larger blocks.
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_schemes")]
    pub schemes: Vec<BlockingScheme>,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            bucket_max: DEFAULT_BUCKET_MAX,
            window: DEFAULT_WINDOW,
            schemes: default_schemes(),
        }
    }
}

fn default_bucket_max() -> usize {
    DEFAULT_BUCKET_MAX
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_schemes() -> Vec<BlockingScheme> {
    BlockingScheme::ALL.to_vec()
}

// ---------------------------------------------------------------------------
// Input + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Retry with a sniffed delimiter when the configured one cannot
    /// resolve the schema.
    #[serde(default = "default_true")]
    pub autodetect_delimiter: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            autodetect_delimiter: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
        }
    }
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.into()
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl DedupConfig {
    pub fn from_toml(input: &str) -> Result<Self, DedupError> {
        let config: DedupConfig =
            toml::from_str(input).map_err(|e| DedupError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DedupError> {
        if self.blocking.bucket_max == 0 {
            return Err(DedupError::ConfigValidation(
                "blocking.bucket_max must be a positive integer".into(),
            ));
        }
        if self.blocking.window == 0 {
            return Err(DedupError::ConfigValidation(
                "blocking.window must be a positive integer".into(),
            ));
        }
        if self.blocking.schemes.is_empty() {
            return Err(DedupError::ConfigValidation(
                "blocking.schemes must name at least one scheme".into(),
            ));
        }

        parse_delimiter("input.delimiter", &self.input.delimiter)?;
        parse_delimiter("output.delimiter", &self.output.delimiter)?;

        for (alias, target) in &self.aliases {
            if Field::from_name(target).is_none() {
                return Err(DedupError::ConfigValidation(format!(
                    "alias '{alias}': '{target}' is not a known column"
                )));
            }
        }

        Ok(())
    }

    pub fn input_delimiter(&self) -> Result<u8, DedupError> {
        parse_delimiter("input.delimiter", &self.input.delimiter)
    }

    pub fn output_delimiter(&self) -> Result<u8, DedupError> {
        parse_delimiter("output.delimiter", &self.output.delimiter)
    }
}

/// A delimiter must be exactly one ASCII character. `\t` is accepted as an
/// escape for tab.
pub fn parse_delimiter(what: &str, value: &str) -> Result<u8, DedupError> {
    let value = if value == "\\t" { "\t" } else { value };
    match value.as_bytes() {
        [b] if b.is_ascii() && *b != b'\n' && *b != b'\r' => Ok(*b),
        _ => Err(DedupError::ConfigValidation(format!(
            "{what} must be a single ASCII character, got {value:?}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
