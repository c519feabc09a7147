//! ONNX classifier backend — local fake-news sequence classifier.
//!
//! Expects an exported `*ForSequenceClassification` model whose first output
//! is `[1, num_labels]` logits. Probabilities are the softmax of the logits;
//! index `i` maps to `labels[i]`, which then goes through
//! [`map_model_label`](crate::classifier::map_model_label).

use async_trait::async_trait;
use ort::session::Session;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;

use crate::classifier::{best_label, ClassifierError, LabelScore, TextClassifier};
use crate::models::ClassificationResult;
use crate::onnx;

/// File stem used when no classifier model path is configured.
pub const DEFAULT_CLASSIFIER_MODEL: &str = "distilbert-fake-news";

#[derive(Debug, Clone)]
pub struct OnnxClassifierConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    /// Raw label names by output index.
    pub labels: Vec<String>,
    /// BERT exports take `token_type_ids`; DistilBERT exports do not.
    pub feed_token_type_ids: bool,
}

pub struct OnnxClassifier {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    labels: Arc<[String]>,
    feed_token_type_ids: bool,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("labels", &self.labels)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    pub fn new(config: OnnxClassifierConfig) -> Result<Self, ClassifierError> {
        for path in [&config.model_path, &config.tokenizer_path] {
            if !path.exists() {
                return Err(ClassifierError::ModelNotFound {
                    path: path.display().to_string(),
                });
            }
        }

        let session =
            onnx::load_session(&config.model_path).map_err(ClassifierError::OnnxInference)?;
        let tokenizer =
            onnx::load_tokenizer(&config.tokenizer_path).map_err(ClassifierError::Tokenizer)?;

        tracing::info!(
            model = %config.model_path.display(),
            labels = ?config.labels,
            "Loaded ONNX classifier model"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            labels: config.labels.into(),
            feed_token_type_ids: config.feed_token_type_ids,
        })
    }
}

#[async_trait]
impl TextClassifier for OnnxClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let labels = Arc::clone(&self.labels);
        let feed_token_type_ids = self.feed_token_type_ids;
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let encoded = onnx::encode(&tokenizer, &text).map_err(ClassifierError::Tokenizer)?;
            let output = {
                let mut guard = session.lock().map_err(|e| {
                    ClassifierError::OnnxInference(format!("session lock poisoned: {e}"))
                })?;
                onnx::run(&mut guard, &encoded, feed_token_type_ids)
                    .map_err(ClassifierError::OnnxInference)?
            };
            let scores = label_scores(&output.data, &labels)?;
            best_label(&scores)
        })
        .await
        .map_err(|e| ClassifierError::OnnxInference(format!("spawn_blocking join error: {e}")))?
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Softmax over one row of logits, paired with the configured label names.
fn label_scores(logits: &[f32], labels: &[String]) -> Result<Vec<LabelScore>, ClassifierError> {
    if logits.len() != labels.len() {
        return Err(ClassifierError::LabelMismatch {
            expected: labels.len(),
            actual: logits.len(),
        });
    }

    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f64> = logits.iter().map(|&l| f64::from(l - max).exp()).collect();
    let total: f64 = exps.iter().sum();

    Ok(labels
        .iter()
        .zip(exps)
        .map(|(label, e)| LabelScore {
            label: label.clone(),
            score: e / total,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label;

    fn labels() -> Vec<String> {
        vec!["LABEL_0".to_string(), "LABEL_1".to_string()]
    }

    #[test]
    fn test_model_not_found_returns_error() {
        let config = OnnxClassifierConfig {
            model_path: PathBuf::from("/nonexistent/clf.onnx"),
            tokenizer_path: PathBuf::from("/nonexistent/clf-tokenizer.json"),
            labels: labels(),
            feed_token_type_ids: false,
        };

        match OnnxClassifier::new(config) {
            Err(ClassifierError::ModelNotFound { path }) => {
                assert!(path.contains("nonexistent"), "path was: {path}");
            }
            other => panic!("Expected ModelNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let scores = label_scores(&[2.0, -1.0], &labels()).unwrap();
        let total: f64 = scores.iter().map(|s| s.score).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(scores[0].score > scores[1].score);
    }

    #[test]
    fn test_logits_pick_fake_label() {
        let scores = label_scores(&[3.0, 0.5], &labels()).unwrap();
        let result = best_label(&scores).unwrap();
        assert_eq!(result.label, Label::Fake);
        assert!(result.confidence > 0.9);
    }

    #[test]
    fn test_label_count_mismatch() {
        assert!(matches!(
            label_scores(&[0.1, 0.2, 0.3], &labels()),
            Err(ClassifierError::LabelMismatch { expected: 2, actual: 3 })
        ));
    }
}
