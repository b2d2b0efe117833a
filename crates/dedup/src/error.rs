use std::fmt;

#[derive(Debug)]
pub enum DedupError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (zero window, bad delimiter, unknown alias target, etc.).
    ConfigValidation(String),
    /// Input header resolves fewer than half of the required fields.
    Schema {
        source: String,
        missing: Vec<String>,
        seen: Vec<String>,
    },
    /// Malformed delimited text.
    Csv { source: String, message: String },
    /// IO error (file read, etc.).
    Io(String),
    /// Run was cancelled between stages.
    Cancelled,
}

impl fmt::Display for DedupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Schema { source, missing, seen } => write!(
                f,
                "{source}: missing {} of {} required columns after header normalization: [{}]; seen columns: [{}]",
                missing.len(),
                crate::model::FIELD_COUNT,
                missing.join(", "),
                seen.join(", "),
            ),
            Self::Csv { source, message } => write!(f, "{source}: {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Cancelled => write!(f, "run cancelled"),
        }
    }
}

impl std::error::Error for DedupError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_message_lists_columns() {
        let err = DedupError::Schema {
            source: "a.csv".into(),
            missing: vec!["flight_no".into(), "docs".into()],
            seen: vec!["name".into()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("a.csv: missing 2 of 20"));
        assert!(msg.contains("flight_no, docs"));
        assert!(msg.contains("seen columns: [name]"));
    }
}
