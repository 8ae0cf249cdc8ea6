use lazy_static::lazy_static;
use regex::Regex;
use shared_types::EntityLabel;

use super::{Span, GENERAL_CONFIDENCE};

/// Legal-form suffixes that close a company name
pub const COMPANY_SUFFIXES: &[&str] = &[
    "Ltd",
    "Limited",
    "Inc",
    "LLC",
    "LLP",
    "Corp",
    "Corporation",
    "PLC",
    "GmbH",
    "SA",
    "SARL",
    "SAS",
    "SASU",
];

lazy_static! {
    static ref COMPANY_NAME: Regex = {
        let suffixes = COMPANY_SUFFIXES.join("|");
        Regex::new(&format!(
            r"\b\p{{Lu}}[\p{{L}}\d&'-]*(?: +(?:&|\p{{Lu}}[\p{{L}}\d&'-]*))* +(?:{})\b\.?",
            suffixes
        ))
        .unwrap()
    };
}

/// Capitalized word runs ending in a legal-form suffix
pub fn find_organizations(text: &str) -> Vec<Span> {
    COMPANY_NAME
        .find_iter(text)
        .map(|m| Span::new(m.start(), m.end(), EntityLabel::Org, GENERAL_CONFIDENCE))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orgs(text: &str) -> Vec<&str> {
        find_organizations(text)
            .iter()
            .map(|s| &text[s.start..s.end])
            .collect()
    }

    #[test]
    fn test_company_with_suffix() {
        assert_eq!(
            orgs("between TechCorp Cameroon Ltd., a company"),
            vec!["TechCorp Cameroon Ltd."]
        );
        assert_eq!(orgs("employed by Acme & Sons LLC"), vec!["Acme & Sons LLC"]);
    }

    #[test]
    fn test_french_legal_forms() {
        assert_eq!(orgs("la société Afrik Services SARL et"), vec!["Afrik Services SARL"]);
    }

    #[test]
    fn test_suffix_must_be_whole_word() {
        assert!(orgs("Senior Salesman").is_empty());
        assert!(orgs("The Employee").is_empty());
    }

    #[test]
    fn test_names_do_not_cross_lines() {
        assert_eq!(orgs("EMPLOYMENT CONTRACT\nBeta Ltd"), vec!["Beta Ltd"]);
    }
}
