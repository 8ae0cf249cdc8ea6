//! Split contract text into bounded pieces for the summarization model
//!
//! Well-structured contracts (at least three clause markers) are cut at the
//! start of each clause heading; everything else is packed sentence by
//! sentence into chunks of at most `max_words` words. Chunks only ever lose
//! whitespace relative to the input, never content.

use contract_nlp::patterns::SECTION_NAMES;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

/// Markers needed before a document counts as structured
pub const MIN_SECTION_MARKERS: usize = 3;
/// Clause fragments shorter than this are folded into a neighbour
pub const MIN_SECTION_CHARS: usize = 50;
/// Upper bound on clause-based segments
pub const MAX_SECTIONS: usize = 10;
/// Fewer usable segments than this means sentence chunking instead
const MIN_SECTION_PARTS: usize = 3;

lazy_static! {
    static ref SECTION_NAME_ALTERNATION: String = SECTION_NAMES
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");

    /// Structural markers counted anywhere in the text
    static ref MARKER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b(?:ARTICLE|SECTION|CLAUSE)\s+\d+").unwrap(),
        Regex::new(r"(?i)\b\d+\.\s*[A-Z][a-z]+").unwrap(),
        Regex::new(&format!(r"(?i)\b(?:{})\b", *SECTION_NAME_ALTERNATION)).unwrap(),
    ];

    /// The same markers, anchored at the start of a line, used as cut points
    static ref SPLIT_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?im)^[ \t]*(?:ARTICLE|SECTION|CLAUSE)\s+\d+").unwrap(),
        Regex::new(r"(?im)^[ \t]*\d+\.\s*[A-Z]").unwrap(),
        Regex::new(&format!(r"(?im)^[ \t]*(?:{})", *SECTION_NAME_ALTERNATION)).unwrap(),
    ];

    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]\s+").unwrap();
}

/// Split text into ordered, non-empty chunks. Blank input yields no chunks.
pub fn chunk_text(text: &str, max_words: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let max_words = max_words.max(1);

    let markers = count_section_markers(text);
    if markers >= MIN_SECTION_MARKERS {
        if let Some(sections) = split_on_sections(text) {
            debug!(
                "Structured document ({} markers): {} section chunks",
                markers,
                sections.len()
            );
            return sections
                .into_iter()
                .flat_map(|section| {
                    if word_count(&section) > max_words {
                        chunk_by_sentences(&section, max_words)
                    } else {
                        vec![section]
                    }
                })
                .collect();
        }
    }

    let chunks = chunk_by_sentences(text, max_words);
    debug!("Sentence chunking: {} chunks", chunks.len());
    chunks
}

/// Total structural marker matches across all marker patterns
pub fn count_section_markers(text: &str) -> usize {
    MARKER_PATTERNS
        .iter()
        .map(|re| re.find_iter(text).count())
        .sum()
}

/// Cut at line-start markers, trying each pattern in turn. Returns `None`
/// when no pattern produces enough usable segments.
fn split_on_sections(text: &str) -> Option<Vec<String>> {
    SPLIT_PATTERNS.iter().find_map(|re| {
        let parts = split_at_matches(text, re);
        // Need at least two cut points to call it a split
        if parts.len() <= 2 {
            return None;
        }
        let sections = cap_sections(merge_short_fragments(parts), MAX_SECTIONS);
        (sections.len() >= MIN_SECTION_PARTS).then_some(sections)
    })
}

fn split_at_matches(text: &str, re: &Regex) -> Vec<String> {
    let mut cuts: Vec<usize> = re.find_iter(text).map(|m| m.start()).collect();
    if cuts.first() != Some(&0) {
        cuts.insert(0, 0);
    }
    cuts.push(text.len());

    cuts.windows(2)
        .map(|w| text[w[0]..w[1]].trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Fold fragments under `MIN_SECTION_CHARS` into the previous segment, or
/// the next one when there is no previous segment
fn merge_short_fragments(parts: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(parts.len());
    let mut pending: Option<String> = None;

    for part in parts {
        let part = match pending.take() {
            Some(prefix) => format!("{}\n{}", prefix, part),
            None => part,
        };
        if part.chars().count() >= MIN_SECTION_CHARS {
            merged.push(part);
        } else if let Some(last) = merged.last_mut() {
            last.push('\n');
            last.push_str(&part);
        } else {
            pending = Some(part);
        }
    }

    if let Some(rest) = pending {
        match merged.last_mut() {
            Some(last) => {
                last.push('\n');
                last.push_str(&rest);
            }
            None => merged.push(rest),
        }
    }
    merged
}

/// Merge the shortest adjacent pair until at most `max` segments remain
fn cap_sections(mut sections: Vec<String>, max: usize) -> Vec<String> {
    while sections.len() > max {
        let idx = (0..sections.len() - 1)
            .min_by_key(|&i| sections[i].len() + sections[i + 1].len())
            .unwrap_or(0);
        let next = sections.remove(idx + 1);
        sections[idx].push('\n');
        sections[idx].push_str(&next);
    }
    sections
}

/// Split after `.`, `!` or `?` followed by whitespace, keeping the punctuation
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut last = 0;
    for m in SENTENCE_END.find_iter(text) {
        // Terminal punctuation is a single byte
        let end = m.start() + 1;
        sentences.push(text[last..end].trim());
        last = m.end();
    }
    sentences.push(text[last..].trim());
    sentences.into_iter().filter(|s| !s.is_empty()).collect()
}

/// Greedily pack sentences into chunks of at most `max_words` words.
/// A single sentence longer than the budget is cut on word boundaries.
pub fn chunk_by_sentences(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_words = 0;

    for sentence in split_sentences(text) {
        let words: Vec<&str> = sentence.split_whitespace().collect();

        if words.len() > max_words {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_words = 0;
            }
            chunks.extend(words.chunks(max_words).map(|w| w.join(" ")));
            continue;
        }

        if current_words + words.len() > max_words && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_words = 0;
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence);
        current_words += words.len();
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
