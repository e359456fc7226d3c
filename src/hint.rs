//! Near-miss hints for rules whose search literal was not found.
//!
//! Matching itself is always exact. When a literal is missing, the most useful
//! thing to tell the user is where the file drifted, so we score every line of
//! the content against the first line of the literal that is not already in
//! the content verbatim.

use strsim::normalized_levenshtein;

/// Lines scoring below this are not worth reporting.
pub const MIN_SIMILARITY: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct LineHint {
    /// 1-based line number in the content
    pub line: usize,
    /// The line as it appears in the content, trimmed
    pub text: String,
    /// Similarity in [0, 1]
    pub score: f64,
}

/// Find the content line closest to the first drifted line of `search`.
///
/// Lines of the literal that still occur verbatim are skipped. If every line
/// survives (e.g. they were reordered), the first non-blank line is used.
pub fn closest_line(content: &str, search: &str) -> Option<LineHint> {
    let mut candidates = search.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = candidates.clone().next()?;
    let needle = candidates
        .find(|l| !content.contains(*l))
        .unwrap_or(first);

    content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(idx, line)| LineHint {
            line: idx + 1,
            text: line.to_string(),
            score: normalized_levenshtein(needle, line),
        })
        .filter(|hint| hint.score >= MIN_SIMILARITY)
        .max_by(|a, b| a.score.total_cmp(&b.score))
}
