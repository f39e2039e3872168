//! Raw source text to validated target identifiers.

use crate::model::TargetId;

/// Split `raw` into lines (`\n` or `\r\n`), trim each, and keep the ones shaped like a
/// target identifier. Order and duplicates are preserved.
#[must_use]
pub fn parse_targets(raw: &str) -> Vec<TargetId> {
    raw.lines()
        .map(str::trim)
        .filter_map(TargetId::parse)
        .collect()
}
