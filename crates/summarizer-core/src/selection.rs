//! Keep the most informative chunks when a document exceeds its chunk budget

use contract_nlp::patterns::{keyword_frequency, CHUNK_IMPORTANCE_KEYWORDS};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Dollar amounts and percentages
    pub(crate) static ref FINANCIAL_PATTERN: Regex = Regex::new(r"\$\d+|\d+%").unwrap();
}

/// Keyword occurrences plus two points per financial figure
pub fn score_chunk(chunk: &str) -> usize {
    keyword_frequency(chunk, CHUNK_IMPORTANCE_KEYWORDS)
        + 2 * FINANCIAL_PATTERN.find_iter(chunk).count()
}

/// Keep the `max_chunks` highest-scoring chunks.
///
/// The result is ordered by descending score (ties keep document order),
/// not by position in the document. Inputs already within budget are
/// returned unchanged.
pub fn select_important_chunks(chunks: Vec<String>, max_chunks: usize) -> Vec<String> {
    if chunks.len() <= max_chunks {
        return chunks;
    }

    let mut scored: Vec<(usize, usize, String)> = chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| (score_chunk(&chunk), index, chunk))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.truncate(max_chunks);
    scored.into_iter().map(|(_, _, chunk)| chunk).collect()
}
