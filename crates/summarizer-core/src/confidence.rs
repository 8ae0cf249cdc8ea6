//! Heuristic confidence for a finished summary

use contract_nlp::patterns::CONFIDENCE_KEY_TERMS;

/// Confidence never reaches certainty
pub const MAX_CONFIDENCE: f64 = 0.95;
/// Coverage assumed when the source mentions none of the key terms
const NEUTRAL_COVERAGE: f64 = 0.5;
const COVERAGE_WEIGHT: f64 = 0.6;
const LENGTH_WEIGHT: f64 = 0.4;

/// Score in `[0, 0.95]`, rounded to two decimals.
///
/// Combines how many key terms from the source survive into the summary
/// with a length ratio that saturates once the summary is a third of the
/// source.
pub fn calculate_confidence(summary: &str, original: &str) -> f64 {
    let summary_lower = summary.to_lowercase();
    let original_lower = original.to_lowercase();

    let in_original: Vec<&str> = CONFIDENCE_KEY_TERMS
        .iter()
        .copied()
        .filter(|term| original_lower.contains(term))
        .collect();

    let coverage = if in_original.is_empty() {
        NEUTRAL_COVERAGE
    } else {
        let kept = in_original
            .iter()
            .filter(|term| summary_lower.contains(*term))
            .count();
        kept as f64 / in_original.len() as f64
    };

    let original_words = original.split_whitespace().count();
    let length_score = if original_words == 0 {
        0.0
    } else {
        let ratio = summary.split_whitespace().count() as f64 / original_words as f64;
        (ratio * 3.0).min(1.0)
    };

    let confidence =
        (COVERAGE_WEIGHT * coverage + LENGTH_WEIGHT * length_score).min(MAX_CONFIDENCE);
    (confidence * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_full_coverage_is_capped() {
        let original = "salary position benefits";
        assert_eq!(calculate_confidence(original, original), 0.95);
    }

    #[test]
    fn test_no_key_terms_uses_neutral_coverage() {
        // 0.6 * 0.5 + 0.4 * min(3 * 2/6, 1) = 0.3 + 0.4
        let original = "one two three four five six";
        assert_eq!(calculate_confidence("one two", original), 0.7);
        // Nothing summarized at all
        assert_eq!(calculate_confidence("", original), 0.3);
    }

    #[test]
    fn test_partial_coverage() {
        // Two of four terms kept; ratio 2/10 -> length 0.6
        let original = "salary position benefits termination a b c d e f";
        let confidence = calculate_confidence("Salary position", original);
        assert_eq!(confidence, 0.54);
    }

    #[test]
    fn test_empty_original() {
        assert_eq!(calculate_confidence("anything", ""), 0.3);
    }

    proptest! {
        #[test]
        fn confidence_is_bounded_and_rounded(
            summary in "[a-z ]{0,200}",
            original in "[a-z ]{0,400}",
        ) {
            let c = calculate_confidence(&summary, &original);
            prop_assert!((0.0..=MAX_CONFIDENCE).contains(&c));
            prop_assert!(((c * 100.0).round() - c * 100.0).abs() < 1e-9);
        }
    }
}
