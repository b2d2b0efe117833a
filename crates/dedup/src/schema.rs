//! Header normalization and column resolution for the 20-field schema.

use std::collections::HashMap;

use crate::error::DedupError;
use crate::model::{Field, FIELD_COUNT};

/// Built-in header aliases, keyed by normalized header.
const BUILTIN_ALIASES: [(&str, Field); 5] = [
    ("dep_air", Field::DepAirport),
    ("arr_air", Field::ArrAirport),
    ("loyalty", Field::LoyaltyPairs),
    ("loyaltypair", Field::LoyaltyPairs),
    ("fare", Field::FareBasis),
];

/// Normalize a raw header cell: drop BOM, turn non-breaking spaces into
/// spaces, lowercase, treat `-` as a space, and join words with `_`.
pub fn clean_header_name(raw: &str) -> String {
    let s = raw.replace('\u{feff}', "").replace('\u{a0}', " ");
    s.trim()
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Maps normalized header names to canonical fields.
#[derive(Debug, Clone)]
pub struct HeaderResolver {
    aliases: HashMap<String, Field>,
}

impl Default for HeaderResolver {
    fn default() -> Self {
        Self {
            aliases: BUILTIN_ALIASES
                .iter()
                .map(|&(name, field)| (name.to_string(), field))
                .collect(),
        }
    }
}

impl HeaderResolver {
    /// Built-in aliases plus `extra` (alias → canonical column name). Alias
    /// keys are normalized the same way as headers. Unknown targets are skipped;
    /// config validation reports them.
    pub fn with_aliases(extra: &HashMap<String, String>) -> Self {
        let mut resolver = Self::default();
        for (alias, target) in extra {
            if let Some(field) = Field::from_name(target) {
                resolver.aliases.insert(clean_header_name(alias), field);
            }
        }
        resolver
    }

    pub fn resolve_name(&self, raw: &str) -> Option<Field> {
        let name = clean_header_name(raw);
        Field::from_name(&name).or_else(|| self.aliases.get(&name).copied())
    }

    /// Resolve a header row. The first column resolving to a field wins.
    pub fn resolve(&self, headers: &[&str]) -> ColumnMap {
        let mut columns = [None; FIELD_COUNT];
        let mut seen = Vec::new();
        for (pos, raw) in headers.iter().enumerate() {
            let cleaned = clean_header_name(raw);
            if cleaned.is_empty() {
                continue;
            }
            if let Some(field) = self.resolve_name(raw) {
                let slot = &mut columns[field.index()];
                if slot.is_none() {
                    *slot = Some(pos);
                }
            }
            seen.push(cleaned);
        }
        ColumnMap { columns, seen }
    }
}

/// Source column position for every field, if present.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    columns: [Option<usize>; FIELD_COUNT],
    seen: Vec<String>,
}

impl ColumnMap {
    pub fn position(&self, field: Field) -> Option<usize> {
        self.columns[field.index()]
    }

    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.position(*f).is_none())
            .collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }

    /// Normalized non-blank header names in source order.
    pub fn seen(&self) -> &[String] {
        &self.seen
    }

    /// Absent columns are tolerated as missing data up to half the schema.
    /// Beyond that the input is the wrong shape, not sparse.
    pub fn check(&self, source: &str) -> Result<(), DedupError> {
        let missing = self.missing();
        if missing.len() > FIELD_COUNT / 2 {
            return Err(DedupError::Schema {
                source: source.to_string(),
                missing: missing.iter().map(|f| f.name().to_string()).collect(),
                seen: self.seen.clone(),
            });
        }
        Ok(())
    }
}
