//! Combine chunk summaries and lay the result out as markdown sections

use contract_nlp::collapse_whitespace;
use contract_nlp::patterns::{categorize_sentence, GENERAL_CATEGORY, SUMMARY_CATEGORIES};
use lazy_static::lazy_static;
use regex::Regex;

/// Combined summaries longer than this multiple of the target are condensed
pub const CONDENSE_RATIO: f64 = 1.2;

lazy_static! {
    static ref SENTENCE_BOUNDARY: Regex = Regex::new(r"[.!?]+").unwrap();
}

/// Join non-empty chunk summaries with single spaces
pub fn join_summaries(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn needs_condensation(summary: &str, target_words: usize) -> bool {
    summary.split_whitespace().count() as f64 > target_words as f64 * CONDENSE_RATIO
}

/// Collapse whitespace, capitalize the first letter of each sentence and
/// make sure the text ends with a period
pub fn postprocess_summary(summary: &str) -> String {
    let collapsed = collapse_whitespace(summary);
    if collapsed.is_empty() {
        return collapsed;
    }

    let mut result = String::with_capacity(collapsed.len() + 1);
    let mut capitalize_next = true;
    let mut after_terminal = false;

    for c in collapsed.chars() {
        if capitalize_next && c.is_alphanumeric() {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }

        if matches!(c, '.' | '!' | '?') {
            after_terminal = true;
        } else if c.is_whitespace() {
            if after_terminal {
                capitalize_next = true;
            }
            after_terminal = false;
        } else {
            after_terminal = false;
        }
    }

    if !result.ends_with('.') {
        result.push('.');
    }
    result
}

/// Split a summary into trimmed, non-empty sentences on `.`, `!` and `?`
pub fn summary_sentences(summary: &str) -> Vec<&str> {
    SENTENCE_BOUNDARY
        .split(summary)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Group sentences under fixed category headings.
///
/// Each sentence lands in the first category whose keywords it contains, or
/// in "General Information". Categories keep their fixed order and empty
/// ones are left out.
pub fn format_markdown(summary: &str) -> String {
    let mut grouped: Vec<Vec<&str>> = vec![Vec::new(); SUMMARY_CATEGORIES.len()];
    let mut unmatched: Vec<&str> = Vec::new();

    for sentence in summary_sentences(summary) {
        match categorize_sentence(sentence)
            .and_then(|name| SUMMARY_CATEGORIES.iter().position(|(n, _)| *n == name))
        {
            Some(idx) => grouped[idx].push(sentence),
            None => unmatched.push(sentence),
        }
    }

    let sections = SUMMARY_CATEGORIES
        .iter()
        .map(|(name, _)| *name)
        .zip(grouped.iter())
        .chain(std::iter::once((GENERAL_CATEGORY, &unmatched)))
        .filter(|(_, sentences)| !sentences.is_empty())
        .map(|(name, sentences)| {
            let bullets: Vec<String> = sentences.iter().map(|s| format!("• {}", s)).collect();
            format!("## {}\n{}", name, bullets.join("\n"))
        })
        .collect::<Vec<_>>();

    sections.join("\n\n")
}
