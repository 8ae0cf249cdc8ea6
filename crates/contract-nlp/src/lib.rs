pub mod cleaning;
pub mod entities;
pub mod language;
pub mod patterns;
pub mod sections;

use serde::Serialize;
use shared_types::{ExtractedEntity, Language};

pub use cleaning::{
    clean_text, collapse_whitespace, emphasize_domain_keywords, preprocess_for_summary,
};
pub use entities::extract_entities;
pub use language::detect_language;
pub use sections::{identify_contract_sections, ContractSection};

/// Result of analyzing freshly extracted contract text
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzedContract {
    pub cleaned_text: String,
    pub language: Language,
    pub entities: Vec<ExtractedEntity>,
    pub sections: Vec<ContractSection>,
}

/// ContractAnalyzer entry point
pub struct ContractAnalyzer;

impl ContractAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Clean raw text, detect its language and pull out entities
    pub fn analyze(&self, raw_text: &str) -> AnalyzedContract {
        let cleaned_text = clean_text(raw_text);
        let language = detect_language(&cleaned_text);
        let entities = extract_entities(&cleaned_text, language);
        let sections = identify_contract_sections(&cleaned_text);

        AnalyzedContract {
            cleaned_text,
            language,
            entities,
            sections,
        }
    }
}

impl Default for ContractAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
