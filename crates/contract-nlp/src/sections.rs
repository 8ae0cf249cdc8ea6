//! Locate the main regions of an employment contract

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::patterns::CONTRACT_SECTION_PATTERNS;

/// Bytes of context kept before the first keyword hit
const WINDOW_BEFORE: usize = 200;
/// Bytes of context kept after the first keyword hit
const WINDOW_AFTER: usize = 500;

lazy_static! {
    static ref SECTION_REGEXES: Vec<(&'static str, Regex)> = CONTRACT_SECTION_PATTERNS
        .iter()
        .map(|(name, pattern)| (*name, Regex::new(pattern).unwrap()))
        .collect();
}

/// A contract region anchored on the first mention of its keywords
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractSection {
    pub name: &'static str,
    /// Offset of the keyword hit the window is built around
    pub anchor: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl ContractSection {
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }
}

/// Find each known section by its first keyword hit and keep a window of
/// context around it. Windows may overlap; sections without a hit are absent.
pub fn identify_contract_sections(text: &str) -> Vec<ContractSection> {
    SECTION_REGEXES
        .iter()
        .filter_map(|(name, re)| {
            let m = re.find(text)?;
            let start = floor_char_boundary(text, m.start().saturating_sub(WINDOW_BEFORE));
            let end = ceil_char_boundary(text, (m.end() + WINDOW_AFTER).min(text.len()));
            Some(ContractSection {
                name,
                anchor: m.start(),
                start,
                end,
                text: text[start..end].to_string(),
            })
        })
        .collect()
}

/// Name of the section an offset belongs to. Among windows covering the
/// offset, the one whose keyword hit most closely precedes it wins; when
/// every covering hit comes later, the first declared section is used.
pub fn section_for_offset(sections: &[ContractSection], offset: usize) -> Option<&'static str> {
    let covering = || sections.iter().filter(|s| s.contains(offset));
    covering()
        .filter(|s| s.anchor <= offset)
        .max_by_key(|s| s.anchor)
        .or_else(|| covering().next())
        .map(|s| s.name)
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}
