//! Rule-based entity recognition for employment contracts
//!
//! Each submodule recognizes one family of mentions and reports byte spans
//! into the input text. Spans are then deduplicated, ordered by position and
//! tagged with the contract section they fall in.

pub mod date;
pub mod money;
pub mod org;
pub mod person;

use shared_types::{EntityLabel, ExtractedEntity, Language};
use tracing::debug;

use crate::sections::{identify_contract_sections, section_for_offset};

/// Confidence given to general-purpose recognizers
pub const GENERAL_CONFIDENCE: f64 = 0.9;
/// Confidence given to salary pattern matches
pub const SALARY_CONFIDENCE: f64 = 0.8;

/// A recognized mention before section tagging
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
    pub confidence: f64,
}

impl Span {
    pub fn new(start: usize, end: usize, label: EntityLabel, confidence: f64) -> Self {
        Self {
            start,
            end,
            label,
            confidence,
        }
    }

    /// Shrink the span so it neither starts nor ends with whitespace or
    /// separators picked up by greedy digit classes. Organizations keep a
    /// trailing period ("Ltd.").
    pub fn trimmed(self, text: &str) -> Option<Self> {
        let slice = &text[self.start..self.end];
        let keep_period = self.label == EntityLabel::Org;
        let head = slice.trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '.');
        let tail = head.trim_end_matches(|c: char| {
            c.is_whitespace() || c == ',' || (c == '.' && !keep_period)
        });
        let start = self.start + (slice.len() - head.len());
        let end = start + tail.len();
        (start < end).then_some(Self { start, end, ..self })
    }

    fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// Extract person, organization, date, money and salary mentions.
///
/// Month names and honorifics follow `language`; currency and salary
/// patterns are matched in both languages since contracts mix them.
pub fn extract_entities(text: &str, language: Language) -> Vec<ExtractedEntity> {
    let mut spans = Vec::new();
    spans.extend(person::find_persons(text, language));
    spans.extend(org::find_organizations(text));
    spans.extend(date::find_dates(text, language));
    spans.extend(money::find_money(text));
    spans.extend(money::find_salaries(text));

    let spans = dedupe(
        spans
            .into_iter()
            .filter_map(|span| span.trimmed(text))
            .collect(),
    );

    let sections = identify_contract_sections(text);
    let entities: Vec<ExtractedEntity> = spans
        .into_iter()
        .map(|span| ExtractedEntity {
            text: text[span.start..span.end].to_string(),
            label: span.label,
            confidence: span.confidence,
            start_offset: span.start,
            end_offset: span.end,
            section: section_for_offset(&sections, span.start).map(str::to_string),
        })
        .collect();

    debug!(
        "Extracted {} entities ({} language)",
        entities.len(),
        language
    );
    entities
}

/// Order spans by position and drop any span nested inside another span
/// with the same label
fn dedupe(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then(b.end.cmp(&a.end))
            .then(a.label.cmp(&b.label))
    });

    let mut kept: Vec<Span> = Vec::with_capacity(spans.len());
    for span in spans {
        let nested = kept
            .iter()
            .any(|k| k.label == span.label && k.contains(&span));
        if !nested {
            kept.push(span);
        }
    }
    kept
}
