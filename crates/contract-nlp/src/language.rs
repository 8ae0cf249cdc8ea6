//! English/French language detection backed by whatlang trigram profiles

use shared_types::Language;
use whatlang::Lang;

/// Classify text as English or French. Anything whatlang cannot place, or
/// places in a third language, is English.
pub fn detect_language(text: &str) -> Language {
    match whatlang::detect(text) {
        Some(info) if info.lang() == Lang::Fra => Language::Fr,
        Some(info) => {
            tracing::trace!(
                "Detected {:?} (confidence {:.2}), treating as English",
                info.lang(),
                info.confidence()
            );
            Language::En
        }
        None => Language::En,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detects_english_contract() {
        let text = "This Employment Contract is entered into between the Company and the Employee. \
                    The Employee shall perform the duties of the position.";
        assert_eq!(detect_language(text), Language::En);
    }

    #[test]
    fn test_detects_french_contract() {
        let text = "Le présent contrat de travail est conclu entre la société et le salarié. \
                    Le salarié sera rémunéré par un salaire mensuel de 2 500 000 FCFA.";
        assert_eq!(detect_language(text), Language::Fr);
    }

    #[test]
    fn test_empty_text_defaults_to_english() {
        assert_eq!(detect_language(""), Language::En);
        assert_eq!(detect_language("12345 !!! ---"), Language::En);
    }

    #[test]
    fn test_other_languages_fall_back_to_english() {
        let text = "El presente contrato de trabajo se celebra entre la empresa y el trabajador, \
                    quien recibirá un salario mensual durante la vigencia del contrato.";
        assert_eq!(detect_language(text), Language::En);
    }

    proptest! {
        #[test]
        fn detection_never_panics(s in "\\PC{0,300}") {
            let _ = detect_language(&s);
        }
    }
}
