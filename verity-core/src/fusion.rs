//! Fusion policy: blend classifier confidence with corpus agreement.
//!
//! ```text
//! agreement  = |{ m in matches : m.label == classification.label }| / k
//! confidence = classifier_weight * classification.confidence
//!            + retrieval_weight  * agreement
//! ```
//!
//! The denominator is the configured `k`, not the number of matches actually
//! returned, so a sparse neighbourhood lowers confidence instead of inflating it.

use crate::config::FusionConfig;
use crate::models::{clamp_unit, ClassificationResult, Label, SimilarityMatch};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Fraction of the k neighbours that carry `label`.
pub fn agreement_ratio(label: Label, matches: &[SimilarityMatch], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let agreeing = matches.iter().take(k).filter(|m| m.label == label).count();
    agreeing as f64 / k as f64
}

/// Returns `(combined_confidence, agreement)`.
pub fn fuse(
    classification: &ClassificationResult,
    matches: &[SimilarityMatch],
    weights: &FusionConfig,
    k: usize,
) -> (f64, f64) {
    let agreement = agreement_ratio(classification.label, matches, k);
    let combined = weights.classifier_weight * classification.confidence
        + weights.retrieval_weight * agreement;
    (clamp_unit(combined), agreement)
}

/// Check that both weights lie in [0, 1] and sum to 1.
pub fn validate_weights(weights: &FusionConfig) -> Result<(), String> {
    let FusionConfig {
        classifier_weight,
        retrieval_weight,
    } = *weights;

    for (name, w) in [
        ("classifier_weight", classifier_weight),
        ("retrieval_weight", retrieval_weight),
    ] {
        if !w.is_finite() || !(0.0..=1.0).contains(&w) {
            return Err(format!("{name} must be within [0, 1], got {w}"));
        }
    }

    let sum = classifier_weight + retrieval_weight;
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(format!("fusion weights must sum to 1, got {sum}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(labels: &[Label]) -> Vec<SimilarityMatch> {
        labels
            .iter()
            .enumerate()
            .map(|(i, l)| SimilarityMatch::new(format!("ref {i}"), *l, 0.9 - i as f64 * 0.05))
            .collect()
    }

    const WEIGHTS: FusionConfig = FusionConfig {
        classifier_weight: 0.7,
        retrieval_weight: 0.3,
    };

    #[test]
    fn test_full_agreement() {
        let c = ClassificationResult::new(Label::Fake, 0.9);
        let (conf, agreement) = fuse(&c, &matches(&[Label::Fake; 5]), &WEIGHTS, 5);
        assert!((agreement - 1.0).abs() < 1e-12);
        assert!((conf - (0.7 * 0.9 + 0.3)).abs() < 1e-12);
    }

    #[test]
    fn test_disagreement_follows_formula() {
        let c = ClassificationResult::new(Label::Real, 0.6);
        let m = matches(&[Label::Fake, Label::Fake, Label::Real, Label::Fake, Label::Fake]);
        let (conf, agreement) = fuse(&c, &m, &WEIGHTS, 5);
        assert!((agreement - 0.2).abs() < 1e-12);
        assert!((conf - (0.7 * 0.6 + 0.3 * 0.2)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_matches_count_against_agreement() {
        let c = ClassificationResult::new(Label::Real, 1.0);
        assert!((agreement_ratio(c.label, &matches(&[Label::Real; 2]), 5) - 0.4).abs() < 1e-12);
        assert_eq!(agreement_ratio(c.label, &[], 5), 0.0);
        assert_eq!(agreement_ratio(c.label, &[], 0), 0.0);
    }

    #[test]
    fn test_validate_weights() {
        assert!(validate_weights(&WEIGHTS).is_ok());
        assert!(validate_weights(&FusionConfig {
            classifier_weight: 1.0,
            retrieval_weight: 0.0
        })
        .is_ok());
        assert!(validate_weights(&FusionConfig {
            classifier_weight: 0.6,
            retrieval_weight: 0.6
        })
        .is_err());
        assert!(validate_weights(&FusionConfig {
            classifier_weight: 1.2,
            retrieval_weight: -0.2
        })
        .is_err());
        assert!(validate_weights(&FusionConfig {
            classifier_weight: f64::NAN,
            retrieval_weight: 0.5
        })
        .is_err());
    }
}
