//! Keyword tables and matching helpers for employment contract text

/// Terms whose frequency makes a chunk worth keeping when over budget
pub const CHUNK_IMPORTANCE_KEYWORDS: &[&str] = &[
    "salary",
    "compensation",
    "position",
    "benefits",
    "termination",
    "responsibilities",
    "employee",
    "employer",
    "contract",
    "agreement",
];

/// Terms that make a sentence worth keeping in an extractive summary
pub const EXTRACTIVE_KEYWORDS: &[&str] = &[
    "salary",
    "compensation",
    "position",
    "benefits",
    "termination",
    "responsibilities",
    "employee",
    "employer",
    "$",
    "%",
];

/// Terms compared between source and summary for the confidence score
pub const CONFIDENCE_KEY_TERMS: &[&str] = &[
    "salary",
    "position",
    "compensation",
    "benefits",
    "termination",
];

/// Section headings that commonly open a contract clause
pub const SECTION_NAMES: &[&str] = &[
    "Parties",
    "Position",
    "Compensation",
    "Benefits",
    "Responsibilities",
    "Termination",
    "Confidentiality",
    "Non-compete",
    "Governing Law",
];

/// Summary categories in output order. A sentence goes to the first
/// category with any keyword contained in it.
pub const SUMMARY_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Parties",
        &["parties", "employer", "employee", "company", "organization"],
    ),
    ("Position", &["position", "role", "title", "job", "duties"]),
    (
        "Compensation",
        &["salary", "compensation", "pay", "wage", "$", "amount"],
    ),
    (
        "Benefits",
        &["benefits", "insurance", "vacation", "leave", "pto", "health"],
    ),
    (
        "Responsibilities",
        &["responsibilities", "duties", "obligations", "tasks"],
    ),
    (
        "Termination",
        &["termination", "end", "notice", "resignation", "dismissal"],
    ),
    (
        "Confidentiality",
        &["confidentiality", "nda", "confidential", "secrets"],
    ),
    (
        "Non-Compete",
        &["non-compete", "competition", "restrictions", "covenant"],
    ),
    (
        "Governing Law",
        &["governing law", "jurisdiction", "legal", "court"],
    ),
];

/// Catch-all category for sentences no keyword list claims
pub const GENERAL_CATEGORY: &str = "General Information";

/// Contract regions located by their first keyword hit
pub const CONTRACT_SECTION_PATTERNS: &[(&str, &str)] = &[
    (
        "job_description",
        r"(?i)job description|duties|responsibilities|fonctions|attributions",
    ),
    (
        "compensation",
        r"(?i)salary|compensation|remuneration|rémunération|salaire|benefits",
    ),
    (
        "working_conditions",
        r"(?i)working hours|work schedule|location|horaires|durée du travail",
    ),
    (
        "termination",
        r"(?i)termination|notice|resignation|préavis|rupture|démission",
    ),
    (
        "confidentiality",
        r"(?i)confidential|non-disclosure|proprietary|confidentialité",
    ),
];

/// Count non-overlapping occurrences of `keyword` in already-lowercased text
pub fn count_occurrences(text_lower: &str, keyword: &str) -> usize {
    if keyword.is_empty() {
        return 0;
    }
    text_lower.matches(keyword).count()
}

/// Total occurrences of every keyword, case-insensitive
pub fn keyword_frequency(text: &str, keywords: &[&str]) -> usize {
    let text_lower = text.to_lowercase();
    keywords
        .iter()
        .map(|kw| count_occurrences(&text_lower, kw))
        .sum()
}

/// Number of distinct keywords present at least once, case-insensitive
pub fn distinct_keyword_hits(text: &str, keywords: &[&str]) -> usize {
    let text_lower = text.to_lowercase();
    keywords
        .iter()
        .filter(|kw| text_lower.contains(&kw.to_lowercase()))
        .count()
}

/// Name of the first summary category claiming the sentence, if any
pub fn categorize_sentence(sentence: &str) -> Option<&'static str> {
    let sentence_lower = sentence.to_lowercase();
    SUMMARY_CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| sentence_lower.contains(kw)))
        .map(|(name, _)| *name)
}
