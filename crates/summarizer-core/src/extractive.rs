//! Deterministic keyword-scored extractive summarizer
//!
//! Used whenever no model is loaded, a chunk is too short for the model, or
//! model output is unusable.

use std::cmp::Ordering;

use contract_nlp::collapse_whitespace;
use contract_nlp::patterns::{distinct_keyword_hits, EXTRACTIVE_KEYWORDS};
use lazy_static::lazy_static;
use regex::Regex;

use crate::selection::FINANCIAL_PATTERN;

/// Sentences shorter than this are never selected
pub const MIN_SENTENCE_WORDS: usize = 5;
/// Number of sentences kept
pub const MAX_SENTENCES: usize = 5;

lazy_static! {
    static ref SENTENCE_BOUNDARY: Regex = Regex::new(r"[.!?]+").unwrap();
}

/// Score one sentence at 0-based position `index`
pub fn score_sentence(sentence: &str, index: usize) -> f64 {
    let keywords = distinct_keyword_hits(sentence, EXTRACTIVE_KEYWORDS) as f64;
    let financial = if FINANCIAL_PATTERN.is_match(sentence) {
        2.0
    } else {
        0.0
    };
    keywords + financial + 1.0 / (index as f64 + 1.0)
}

/// Pick the five best sentences, joined with ". " and cut to `max_words`.
///
/// Text without any sentence of at least five words is returned as-is,
/// cut to `max_words`.
pub fn extractive_summary(text: &str, max_words: usize) -> String {
    let sentences: Vec<String> = SENTENCE_BOUNDARY
        .split(text)
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
        .collect();

    let mut scored: Vec<(f64, usize, &str)> = sentences
        .iter()
        .enumerate()
        .filter(|(_, s)| s.split_whitespace().count() >= MIN_SENTENCE_WORDS)
        .map(|(i, s)| (score_sentence(s, i), i, s.as_str()))
        .collect();

    if scored.is_empty() {
        let fallback = truncate_words(&collapse_whitespace(text), max_words);
        return if fallback.is_empty() {
            fallback
        } else {
            ensure_period(fallback)
        };
    }

    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    let selected: Vec<&str> = scored
        .iter()
        .take(MAX_SENTENCES)
        .map(|(_, _, s)| *s)
        .collect();

    ensure_period(truncate_words(&selected.join(". "), max_words))
}

/// Keep the first `max_words` words, marking a cut with "..."
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        format!("{}...", words[..max_words].join(" "))
    } else {
        text.to_string()
    }
}

fn ensure_period(mut text: String) -> String {
    if !text.ends_with('.') {
        text.push('.');
    }
    text
}
