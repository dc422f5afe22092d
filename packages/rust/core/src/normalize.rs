//! Canonical forms for author names and keyword/subtopic tokens.
//!
//! These give every document the same join key for a given person or
//! concept, so entity linking works across documents.

use std::sync::LazyLock;

use regex::Regex;

use docenrich_shared::DocumentMetadata;

static WHITESPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Rewrite `"Last, First"` as `"First Last"`. Names without a comma are
/// returned unchanged.
///
/// Only the first comma splits. The result is stable under a second pass
/// only when the input holds at most one comma: a suffixed name such as
/// `"King, Martin Luther, Jr."` gives `"Martin Luther, Jr. King"`, which
/// still contains a comma and is reordered again if normalized twice.
pub fn normalize_author(name: &str) -> String {
    match name.split_once(',') {
        Some((last, first)) => {
            let (last, first) = (last.trim(), first.trim());
            match (first.is_empty(), last.is_empty()) {
                (true, _) => last.to_string(),
                (_, true) => first.to_string(),
                _ => format!("{first} {last}"),
            }
        }
        None => name.to_string(),
    }
}

/// Lower-case a token and collapse each whitespace run into one `_`.
pub fn normalize_token(value: &str) -> String {
    WHITESPACE_RUN_RE
        .replace_all(&value.to_lowercase(), "_")
        .into_owned()
}

/// Element-wise [`normalize_author`]; order is preserved.
pub fn normalize_authors(authors: &[String]) -> Vec<String> {
    authors.iter().map(|a| normalize_author(a)).collect()
}

/// Element-wise [`normalize_token`]. Order and duplicates are preserved.
pub fn normalize_tokens(values: &[String]) -> Vec<String> {
    values.iter().map(|v| normalize_token(v)).collect()
}

/// Normalize authors, keywords and subtopics in place.
pub fn normalize_metadata(metadata: &mut DocumentMetadata) {
    metadata.authors = normalize_authors(&metadata.authors);
    metadata.keywords = normalize_tokens(&metadata.keywords);
    metadata.subtopics = normalize_tokens(&metadata.subtopics);
}
