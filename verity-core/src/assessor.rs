//! Credibility assessor — routes one submission through the classifier and
//! the retriever, then fuses both into a [`Verdict`].
//!
//! The assessor owns no mutable state. Each external call is bounded by its
//! own timeout; any failure aborts the assessment, there are no partial
//! verdicts.

use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use thiserror::Error;

use crate::classifier::TextClassifier;
use crate::config::{FusionConfig, VerityConfig};
use crate::fusion;
use crate::models::{ConfidenceBucket, SimilarityMatch, Verdict};
use crate::recommend;
use crate::retriever::SimilarityRetriever;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Classifier unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Reference index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Invalid assessor configuration: {0}")]
    InvalidConfig(String),
}

impl AssessError {
    /// Stable identifier used by the JSON API.
    pub fn kind(&self) -> &'static str {
        match self {
            AssessError::InvalidInput(_) => "invalid_input",
            AssessError::ModelUnavailable(_) => "model_unavailable",
            AssessError::IndexUnavailable(_) => "index_unavailable",
            AssessError::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Message shown to the person who submitted the text.
    pub fn user_message(&self) -> &'static str {
        match self {
            AssessError::InvalidInput(_) => "Please enter some news content to analyze.",
            AssessError::ModelUnavailable(_) => {
                "The credibility model is unavailable right now. Please try again later."
            }
            AssessError::IndexUnavailable(_) => {
                "The reference news database is unavailable right now. Please try again later."
            }
            AssessError::InvalidConfig(_) => "The service is misconfigured.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessorConfig {
    /// Number of reference neighbours to retrieve.
    pub k: usize,
    pub fusion: FusionConfig,
    pub classifier_timeout: Duration,
    pub retriever_timeout: Duration,
    pub min_chars: Option<usize>,
    pub max_classifier_chars: usize,
}

impl Default for AssessorConfig {
    fn default() -> Self {
        Self::from(&VerityConfig::default())
    }
}

impl From<&VerityConfig> for AssessorConfig {
    fn from(config: &VerityConfig) -> Self {
        Self {
            k: config.retrieval.k,
            fusion: config.fusion,
            classifier_timeout: Duration::from_millis(config.classifier.timeout_ms),
            retriever_timeout: Duration::from_millis(config.retrieval.timeout_ms),
            min_chars: config.input.min_chars,
            max_classifier_chars: config.input.max_classifier_chars,
        }
    }
}

impl AssessorConfig {
    pub fn validate(&self) -> Result<(), AssessError> {
        if self.k == 0 {
            return Err(AssessError::InvalidConfig("k must be at least 1".to_string()));
        }
        if self.classifier_timeout.is_zero() || self.retriever_timeout.is_zero() {
            return Err(AssessError::InvalidConfig(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.max_classifier_chars == 0 {
            return Err(AssessError::InvalidConfig(
                "max_classifier_chars must be at least 1".to_string(),
            ));
        }
        fusion::validate_weights(&self.fusion).map_err(AssessError::InvalidConfig)
    }
}

pub struct CredibilityAssessor {
    classifier: Arc<dyn TextClassifier>,
    retriever: Arc<dyn SimilarityRetriever>,
    config: AssessorConfig,
}

impl std::fmt::Debug for CredibilityAssessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredibilityAssessor")
            .field("classifier", &self.classifier.name())
            .field("retriever", &self.retriever.name())
            .field("config", &self.config)
            .finish()
    }
}

impl CredibilityAssessor {
    pub fn new(
        classifier: Arc<dyn TextClassifier>,
        retriever: Arc<dyn SimilarityRetriever>,
        config: AssessorConfig,
    ) -> Result<Self, AssessError> {
        config.validate()?;
        Ok(Self {
            classifier,
            retriever,
            config,
        })
    }

    pub fn config(&self) -> &AssessorConfig {
        &self.config
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn retriever_name(&self) -> &str {
        self.retriever.name()
    }

    /// Assess one submission.
    pub async fn assess(&self, text: &str) -> Result<Verdict, AssessError> {
        let text = normalize_text(text);
        if text.is_empty() {
            return Err(AssessError::InvalidInput(
                "text is empty or whitespace only".to_string(),
            ));
        }
        if let Some(min) = self.config.min_chars {
            let len = text.chars().count();
            if len < min {
                return Err(AssessError::InvalidInput(format!(
                    "text has {len} characters, at least {min} required"
                )));
            }
        }

        let model_input = truncate_chars(&text, self.config.max_classifier_chars);
        let classification = match tokio::time::timeout(
            self.config.classifier_timeout,
            self.classifier.classify(model_input),
        )
        .await
        {
            Ok(Ok(c)) => c,
            Ok(Err(e)) => {
                tracing::warn!(classifier = self.classifier.name(), error = %e, "Classification failed");
                return Err(AssessError::ModelUnavailable(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(
                    classifier = self.classifier.name(),
                    timeout_ms = self.config.classifier_timeout.as_millis() as u64,
                    "Classification timed out"
                );
                return Err(AssessError::ModelUnavailable(format!(
                    "timed out after {:?}",
                    self.config.classifier_timeout
                )));
            }
        };

        let k = self.config.k;
        let matches = match tokio::time::timeout(
            self.config.retriever_timeout,
            self.retriever.search(&text, k),
        )
        .await
        {
            Ok(Ok(m)) => m,
            Ok(Err(e)) => {
                tracing::warn!(retriever = self.retriever.name(), error = %e, "Similarity search failed");
                return Err(AssessError::IndexUnavailable(e.to_string()));
            }
            Err(_) => {
                tracing::warn!(
                    retriever = self.retriever.name(),
                    timeout_ms = self.config.retriever_timeout.as_millis() as u64,
                    "Similarity search timed out"
                );
                return Err(AssessError::IndexUnavailable(format!(
                    "timed out after {:?}",
                    self.config.retriever_timeout
                )));
            }
        };

        let matches = normalize_matches(matches, k);
        let (confidence, agreement) =
            fusion::fuse(&classification, &matches, &self.config.fusion, k);
        let bucket = ConfidenceBucket::from_confidence(confidence);
        let label = classification.label;

        tracing::info!(
            label = %label,
            confidence,
            agreement,
            bucket = %bucket,
            matches = matches.len(),
            "Assessment complete"
        );

        Ok(Verdict {
            label,
            confidence,
            bucket,
            classification,
            agreement,
            matches,
            recommendations: recommend::recommendations(label, bucket),
        })
    }
}

/// Re-clamp scores, sort by descending score (stable) and keep at most `k`.
fn normalize_matches(matches: Vec<SimilarityMatch>, k: usize) -> Vec<SimilarityMatch> {
    let mut matches: Vec<SimilarityMatch> = matches
        .into_iter()
        .map(|m| SimilarityMatch::new(m.text, m.label, m.score))
        .collect();
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches.truncate(k);
    matches
}

/// Zero-width space, non-joiner, joiner, word joiner and BOM. Invisible
/// in a browser form, so text made only of them counts as empty.
fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}')
}

fn separator_runs() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s\u{200B}-\u{200D}\u{2060}\u{FEFF}]+").ok())
        .as_ref()
}

/// Collapse whitespace and zero-width characters to single spaces and trim.
pub fn normalize_text(text: &str) -> String {
    match separator_runs() {
        Some(re) => re.replace_all(text, " ").trim().to_string(),
        None => text
            .split(|c: char| c.is_whitespace() || is_zero_width(c))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
