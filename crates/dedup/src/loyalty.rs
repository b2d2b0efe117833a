//! Loyalty-program membership lists.
//!
//! `loyalty_pairs` holds a set of tokens joined by `|`. Order carries no
//! meaning and repeated tokens collapse.

use std::collections::BTreeSet;

pub const SEPARATOR: char = '|';

/// Parse a serialized loyalty list into its token set. Blank tokens are dropped.
pub fn parse_tokens(value: &str) -> BTreeSet<&str> {
    value
        .split(SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Compatible when either side is empty or the sets share a token.
pub fn loyalty_compatible(a: &str, b: &str) -> bool {
    let left = parse_tokens(a);
    let right = parse_tokens(b);
    if left.is_empty() || right.is_empty() {
        return true;
    }
    !left.is_disjoint(&right)
}

/// Sorted, deduplicated union of every list, re-serialized.
pub fn loyalty_union<'a, I>(values: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut union = BTreeSet::new();
    for v in values {
        union.extend(parse_tokens(v));
    }
    union.into_iter().collect::<Vec<_>>().join("|")
}
