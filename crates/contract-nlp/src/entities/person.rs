use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{EntityLabel, Language};

use super::{Span, GENERAL_CONFIDENCE};

lazy_static! {
    static ref EN_HONORIFIC: Regex = Regex::new(
        r"\b(?:Mr|Mrs|Ms|Miss|Dr|Prof)\.? +\p{Lu}\p{Ll}+(?: +\p{Lu}\p{Ll}+)*"
    )
    .unwrap();

    static ref FR_HONORIFIC: Regex = Regex::new(
        r"(?:\bM\.|\bMme|\bMlle|\bMonsieur|\bMadame|\bMademoiselle) +\p{Lu}\p{Ll}+(?: +\p{Lu}\p{Ll}+)*"
    )
    .unwrap();

    /// `John Doe (the "Employee")` / `Awa Ngono (ci-après la "Salariée")`
    static ref DEFINED_PARTY: Regex = Regex::new(
        r#"(\p{Lu}\p{Ll}+(?: \p{Lu}\p{Ll}+){1,2}) *\((?:the |ci-après (?:le |la |l')?|hereinafter (?:the )?)?["“«]? *(?:Employee|Employer|Salariée?|Employée?)"#
    )
    .unwrap();

    /// Signature blocks: `Name: John Doe` / `Nom : Awa Ngono`
    static ref NAME_FIELD: Regex = Regex::new(
        r"(?m)^(?:Name|Employee Name|Nom|Nom et prénom) *: *(\p{Lu}\p{Ll}+(?: \p{Lu}\p{Ll}+){1,3})"
    )
    .unwrap();
}

pub fn find_persons(text: &str, language: Language) -> Vec<Span> {
    let honorific: &Regex = match language {
        Language::En => &*EN_HONORIFIC,
        Language::Fr => &*FR_HONORIFIC,
    };

    let mut spans: Vec<Span> = honorific
        .find_iter(text)
        .map(|m| Span::new(m.start(), m.end(), EntityLabel::Person, GENERAL_CONFIDENCE))
        .collect();

    for re in [&*DEFINED_PARTY, &*NAME_FIELD] {
        spans.extend(re.captures_iter(text).filter_map(|caps| {
            let m = caps.get(1)?;
            Some(Span::new(
                m.start(),
                m.end(),
                EntityLabel::Person,
                GENERAL_CONFIDENCE,
            ))
        }));
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str, language: Language) -> Vec<&str> {
        find_persons(text, language)
            .iter()
            .map(|s| &text[s.start..s.end])
            .collect()
    }

    #[test]
    fn test_english_honorific() {
        assert_eq!(
            names("Signed by Dr. Jane Smith on behalf of the employer", Language::En),
            vec!["Dr. Jane Smith"]
        );
    }

    #[test]
    fn test_defined_employee_party() {
        let text = r#"between the Company and John Doe (the "Employee")."#;
        assert_eq!(names(text, Language::En), vec!["John Doe"]);
    }

    #[test]
    fn test_signature_name_field() {
        let text = "Employer signature\nName: Paul Biya Mbarga\nDate: 2024-01-15";
        assert_eq!(names(text, Language::En), vec!["Paul Biya Mbarga"]);
    }

    #[test]
    fn test_french_honorific() {
        assert_eq!(
            names("conclu avec Monsieur Jean Kamga, ingénieur", Language::Fr),
            vec!["Monsieur Jean Kamga"]
        );
    }

    #[test]
    fn test_lowercase_words_are_not_names() {
        assert!(names("the employee shall report to the manager", Language::En).is_empty());
    }
}
