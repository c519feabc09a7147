use serde::{Deserialize, Serialize};

use super::Label;

/// Output of a text classifier: the winning label and its probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub confidence: f64,
}

impl ClassificationResult {
    /// Non-finite confidence collapses to 0.
    pub fn new(label: Label, confidence: f64) -> Self {
        Self {
            label,
            confidence: clamp_unit(confidence),
        }
    }
}

/// A reference corpus entry returned by the retriever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatch {
    pub text: String,
    pub label: Label,
    pub score: f64,
}

impl SimilarityMatch {
    pub fn new(text: impl Into<String>, label: Label, score: f64) -> Self {
        Self {
            text: text.into(),
            label,
            score: clamp_unit(score),
        }
    }
}

pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
