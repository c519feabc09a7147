use serde::{Deserialize, Serialize};

use super::{ClassificationResult, ConfidenceBucket, Label, SimilarityMatch};

/// Fused credibility assessment for one submission.
///
/// Every field is derived from `classification` and `matches`; nothing here
/// depends on wall-clock time or request identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: Label,
    pub confidence: f64,
    pub bucket: ConfidenceBucket,
    pub classification: ClassificationResult,
    /// Fraction of the k retrieved neighbours sharing the classifier's label.
    pub agreement: f64,
    pub matches: Vec<SimilarityMatch>,
    pub recommendations: Vec<String>,
}
