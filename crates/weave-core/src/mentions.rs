//! @mention and #hashtag extraction from free text.
//!
//! Tokens are ASCII `[A-Za-z0-9_]+` runs following the marker, lower-cased
//! and deduplicated.

use std::collections::BTreeSet;

fn extract_marked(text: &str, marker: char) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    let mut rest = text;

    while let Some(pos) = rest.find(marker) {
        let tail = &rest[pos + marker.len_utf8()..];
        let end = tail
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(tail.len());
        if end > 0 {
            found.insert(tail[..end].to_ascii_lowercase());
        }
        rest = &tail[end..];
    }

    found
}

/// Lower-cased `@handle` tokens, deduplicated.
pub fn extract_mentions(text: &str) -> BTreeSet<String> {
    extract_marked(text, '@')
}

/// Lower-cased `#tag` tokens, deduplicated.
pub fn extract_hashtags(text: &str) -> BTreeSet<String> {
    extract_marked(text, '#')
}
