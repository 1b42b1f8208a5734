//! Shared text helpers: tag parsing, display truncation, key masking.
//!
//! Truncation is UTF-8-safe; byte slicing directly can panic when the cut
//! falls inside a multi-byte character.

use std::collections::BTreeSet;

/// Parse comma-separated tags with whitespace stripping and deduplication.
///
/// Returns a sorted list so repeated invocations produce stable output.
pub fn parse_tags(tags_str: &str) -> Vec<String> {
    tags_str
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Format tags for a table cell, truncating past `max_tags`.
///
/// `["a", "b", "c", "d"]` with `max_tags = 3` renders as `a, b, c, +1 more`.
pub fn format_tags(tags: &[String], max_tags: usize) -> String {
    if tags.len() <= max_tags {
        return tags.join(", ");
    }
    let shown = tags[..max_tags].join(", ");
    format!("{shown}, +{} more", tags.len() - max_tags)
}

/// Truncate by characters and append an ellipsis when truncation occurs.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars).collect();
    format!("{prefix}…")
}

/// Mask a secret, showing only the last 4 characters.
pub fn mask_key(key: &str) -> String {
    if key.chars().count() <= 4 {
        return "****".to_string();
    }
    let tail: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("****{tail}")
}
