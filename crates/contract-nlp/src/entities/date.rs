use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{EntityLabel, Language};

use super::{Span, GENERAL_CONFIDENCE};

const EN_MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December";
const FR_MONTHS: &str =
    "janvier|février|fevrier|mars|avril|mai|juin|juillet|août|aout|septembre|octobre|novembre|décembre|decembre";

lazy_static! {
    static ref EN_DATES: Vec<Regex> = vec![
        // January 15, 2024
        Regex::new(&format!(
            r"\b(?:{}) +\d{{1,2}}(?:st|nd|rd|th)?,? +\d{{4}}\b",
            EN_MONTHS
        ))
        .unwrap(),
        // 15th January 2024
        Regex::new(&format!(
            r"\b\d{{1,2}}(?:st|nd|rd|th)? +(?:of +)?(?:{}),? +\d{{4}}\b",
            EN_MONTHS
        ))
        .unwrap(),
    ];

    static ref FR_DATES: Vec<Regex> = vec![
        // 1er mars 2024
        Regex::new(&format!(r"(?i)\b\d{{1,2}}(?:er)? +(?:{}) +\d{{4}}\b", FR_MONTHS)).unwrap(),
    ];

    static ref NUMERIC_DATES: Vec<Regex> = vec![
        Regex::new(r"\b\d{1,2}[/.-]\d{1,2}[/.-]\d{4}\b").unwrap(),
        Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap(),
    ];
}

/// Spelled-out dates in the contract language plus numeric dates
pub fn find_dates(text: &str, language: Language) -> Vec<Span> {
    let spelled: &[Regex] = match language {
        Language::En => EN_DATES.as_slice(),
        Language::Fr => FR_DATES.as_slice(),
    };

    spelled
        .iter()
        .chain(NUMERIC_DATES.iter())
        .flat_map(|re| re.find_iter(text))
        .map(|m| Span::new(m.start(), m.end(), EntityLabel::Date, GENERAL_CONFIDENCE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(text: &str, language: Language) -> Vec<&str> {
        let mut found: Vec<_> = find_dates(text, language)
            .iter()
            .map(|s| &text[s.start..s.end])
            .collect();
        found.sort();
        found
    }

    #[test]
    fn test_english_spelled_dates() {
        assert_eq!(
            dates("Start Date: January 15, 2024; ends 3rd March 2025", Language::En),
            vec!["3rd March 2025", "January 15, 2024"]
        );
    }

    #[test]
    fn test_french_spelled_dates() {
        assert_eq!(
            dates("prend effet le 1er Septembre 2024", Language::Fr),
            vec!["1er Septembre 2024"]
        );
    }

    #[test]
    fn test_numeric_dates_any_language() {
        assert_eq!(dates("signé le 15/01/2024", Language::Fr), vec!["15/01/2024"]);
        assert_eq!(dates("effective 2024-01-15", Language::En), vec!["2024-01-15"]);
    }

    #[test]
    fn test_durations_are_not_dates() {
        assert!(dates("Probation Period: 3 months, 40 hours per week", Language::En).is_empty());
    }
}
