//! Text normalization applied after extraction and before summarization

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Page headers/footers such as "Page 3" or "Page 3 of 12"
    static ref PAGE_MARKER: Regex = Regex::new(r"\bPage\s+\d+(?:\s+of\s+\d+)?\b").unwrap();

    /// Bare page counter token such as "3/12"
    static ref PAGE_COUNTER: Regex = Regex::new(r"^\d{1,3}/\d{1,3}$").unwrap();

    /// Separator rules drawn with dashes, underscores or equals signs
    static ref SEPARATOR: Regex = Regex::new(r"[-_=]{3,}").unwrap();

    static ref REPEATED_PERIODS: Regex = Regex::new(r"\.{2,}").unwrap();
    static ref REPEATED_COMMAS: Regex = Regex::new(r",{2,}").unwrap();

    /// Domain terms mapped to a canonical upper-case tag for model input
    static ref KEYWORD_EMPHASIS: Vec<(Regex, &'static str)> = vec![
        (Regex::new(r"(?i)\b(?:salary|compensation|remuneration)\b").unwrap(), "SALARY"),
        (Regex::new(r"(?i)\b(?:position|job title|role)\b").unwrap(), "POSITION"),
        (Regex::new(r"(?i)\b(?:responsibilities|duties)\b").unwrap(), "RESPONSIBILITIES"),
        (Regex::new(r"(?i)\b(?:benefits|insurance|allowance)\b").unwrap(), "BENEFITS"),
        (Regex::new(r"(?i)\b(?:termination|notice)\b").unwrap(), "TERMINATION"),
        (Regex::new(r"(?i)\b(?:working hours|schedule)\b").unwrap(), "WORKING_CONDITIONS"),
    ];
}

/// Normalize raw extracted text.
///
/// Page markers and bare page counters are dropped, runs of spaces collapse
/// to one, lines are trimmed and blank lines removed. Single line breaks are
/// kept so clause headings still start a line.
pub fn clean_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = PAGE_MARKER.replace_all(&text, "");

    text.lines()
        .map(|line| {
            line.split_whitespace()
                .filter(|token| !PAGE_COUNTER.is_match(token))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prepare cleaned text for chunking and generation: separator rules are
/// removed and repeated periods/commas collapsed. Line breaks survive.
pub fn preprocess_for_summary(text: &str) -> String {
    let text = SEPARATOR.replace_all(text, "");
    let text = REPEATED_PERIODS.replace_all(&text, ".");
    let text = REPEATED_COMMAS.replace_all(&text, ",");
    clean_lines(&text)
}

/// Rewrite domain terms to their canonical tags (e.g. "remuneration" -> "SALARY")
pub fn emphasize_domain_keywords(text: &str) -> String {
    let mut result = text.to_string();
    for (pattern, tag) in KEYWORD_EMPHASIS.iter() {
        result = pattern.replace_all(&result, *tag).into_owned();
    }
    result
}

/// Collapse every whitespace run (line breaks included) to a single space
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean_lines(text: &str) -> String {
    text.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
