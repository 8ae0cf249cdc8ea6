//! Currency amounts and salary statements

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::EntityLabel;

use super::{Span, GENERAL_CONFIDENCE, SALARY_CONFIDENCE};

/// Amount with optional thousands separators: 2,500,000 / 2 500 000 / 1.500,50 / 4500
const AMOUNT: &str = r"\d{1,3}(?:[,. \u{A0}]\d{3})+(?:[.,]\d{1,2})?|\d+(?:[.,]\d{1,2})?";

const CURRENCY_WORDS: &str = r"fcfa|f\s?cfa|xaf|eur|euros?|usd|dollars?|francs?\s+cfa";

lazy_static! {
    static ref MONEY: Regex = Regex::new(&format!(
        r"(?i)[$€£] ?(?:{amount})|(?:{amount}) ?(?:{currency})\b|(?:{amount}) ?[$€£]",
        amount = AMOUNT,
        currency = CURRENCY_WORDS
    ))
    .unwrap();

    /// Salary statements, English and French
    static ref SALARY_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)salary[:\s]+([\d\s.,]+)\s*(fcfa|euros?|dollars?)").unwrap(),
        Regex::new(r"(?i)([\d\s.,]+)\s*(fcfa|euros?|dollars?)\s*(?:per|/)\s*month").unwrap(),
        Regex::new(
            r"(?i)salaire(?:\s+(?:de\s+base|mensuel|brut))?[:\s]+(?:de\s+)?([\d\s.,]+)\s*(fcfa|euros?)"
        )
        .unwrap(),
        Regex::new(r"(?i)([\d\s.,]+)\s*(fcfa|euros?)\s*(?:par|/)\s*mois").unwrap(),
    ];
}

/// Currency amounts in symbol or currency-word form
pub fn find_money(text: &str) -> Vec<Span> {
    MONEY
        .find_iter(text)
        .map(|m| Span::new(m.start(), m.end(), EntityLabel::Money, GENERAL_CONFIDENCE))
        .collect()
}

/// Salary statements such as "Salary: 2,500,000 FCFA" or "450 000 FCFA par mois"
pub fn find_salaries(text: &str) -> Vec<Span> {
    SALARY_PATTERNS
        .iter()
        .flat_map(|re| re.find_iter(text))
        .filter(|m| m.as_str().chars().any(|c| c.is_ascii_digit()))
        .map(|m| Span::new(m.start(), m.end(), EntityLabel::Salary, SALARY_CONFIDENCE))
        .collect()
}
