//! CLI Exit Code Registry
//!
//! Single source of truth for `tripmerge` exit codes. Scripts rely on them.
//!
//! | Range | Domain    | Description                              |
//! |-------|-----------|------------------------------------------|
//! | 0     | Universal | Success                                  |
//! | 1     | Universal | General error (unspecified)              |
//! | 2     | Universal | CLI usage error (bad args, flag clashes) |
//! | 3-9   | dedup     | Input schema, config, IO, cancellation   |
//!
//! New codes go in the matching range, get a doc line saying what triggers
//! them, and are wired through [`dedup_exit_code`] when they come from the
//! engine.

use tripmerge_dedup::DedupError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or conflicting options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Dedup (3-9)
// =============================================================================

/// An input header resolves fewer than half of the required columns.
pub const EXIT_DEDUP_SCHEMA: u8 = 3;

/// Config file does not parse or fails validation (zero window, bad
/// delimiter, unknown alias target).
pub const EXIT_DEDUP_INVALID_CONFIG: u8 = 4;

/// Cannot read an input or write an output.
pub const EXIT_DEDUP_IO: u8 = 5;

/// Run was cancelled between stages.
pub const EXIT_DEDUP_CANCELLED: u8 = 6;

/// Map an engine error to its exit code.
pub fn dedup_exit_code(err: &DedupError) -> u8 {
    match err {
        DedupError::Schema { .. } => EXIT_DEDUP_SCHEMA,
        DedupError::ConfigParse(_) | DedupError::ConfigValidation(_) => EXIT_DEDUP_INVALID_CONFIG,
        DedupError::Csv { .. } | DedupError::Io(_) => EXIT_DEDUP_IO,
        DedupError::Cancelled => EXIT_DEDUP_CANCELLED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_land_in_dedup_range() {
        let errors = [
            DedupError::Schema { source: "a.csv".into(), missing: vec![], seen: vec![] },
            DedupError::ConfigParse("x".into()),
            DedupError::ConfigValidation("x".into()),
            DedupError::Csv { source: "a.csv".into(), message: "x".into() },
            DedupError::Io("x".into()),
            DedupError::Cancelled,
        ];
        for err in &errors {
            let code = dedup_exit_code(err);
            assert!((3..=9).contains(&code), "{err}: {code}");
        }
        assert_eq!(dedup_exit_code(&errors[0]), EXIT_DEDUP_SCHEMA);
        assert_eq!(dedup_exit_code(&errors[2]), EXIT_DEDUP_INVALID_CONFIG);
    }
}
