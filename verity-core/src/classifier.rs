//! Text classifier boundary — turns news text into a real/fake label with a
//! confidence score.
//!
//! Backends:
//! - **HTTP** — hosted text-classification endpoint (Hugging Face Inference API layout)
//! - **ONNX** — local sequence-classification model, see [`crate::onnx_classifier`]

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

use crate::embeddings::InferenceErrorResponse;
use crate::models::{ClassificationResult, Label};

// ============================================================================
// TextClassifier trait
// ============================================================================

#[async_trait]
pub trait TextClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError>;

    /// Backend name for logging and health output.
    fn name(&self) -> &str;
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Classifier returned no labels")]
    EmptyResponse,

    #[error("All {attempts} classification attempts failed")]
    RetryExhausted { attempts: usize },

    #[error("Classifier model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Model has {actual} output classes but {expected} labels are configured")]
    LabelMismatch { expected: usize, actual: usize },

    #[error("ONNX inference error: {0}")]
    OnnxInference(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

/// Map a raw model label onto real/fake.
///
/// Fake-news fine-tunes emit `LABEL_1` (real) / `LABEL_0` (fake) or spelled
/// out names; a sentiment model used as a stand-in emits POSITIVE/NEGATIVE,
/// where POSITIVE is read as real and anything unrecognized as fake.
pub fn map_model_label(raw: &str) -> Label {
    let upper = raw.trim().to_ascii_uppercase();
    if upper == "LABEL_1" || upper.contains("REAL") {
        Label::Real
    } else if upper == "LABEL_0" || upper.contains("FAKE") {
        Label::Fake
    } else if upper == "POSITIVE" {
        Label::Real
    } else {
        Label::Fake
    }
}

/// A raw `(label, score)` pair as emitted by a classification head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Pick the highest scoring label; the first one wins a tie.
pub fn best_label(scores: &[LabelScore]) -> Result<ClassificationResult, ClassifierError> {
    let best = scores
        .iter()
        .filter(|s| s.score.is_finite())
        .fold(None::<&LabelScore>, |best, s| match best {
            Some(b) if b.score >= s.score => Some(b),
            _ => Some(s),
        })
        .ok_or(ClassifierError::EmptyResponse)?;

    Ok(ClassificationResult::new(
        map_model_label(&best.label),
        best.score,
    ))
}

// ============================================================================
// HttpClassifier
// ============================================================================

#[derive(Debug, Clone)]
pub struct HttpClassifierConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    options: ClassifyOptions,
}

#[derive(Debug, Serialize)]
struct ClassifyOptions {
    wait_for_model: bool,
}

/// Single-input calls come back either flat or wrapped in a batch dimension.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl ClassifyResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            ClassifyResponse::Batched(rows) => rows.into_iter().next().unwrap_or_default(),
            ClassifyResponse::Flat(scores) => scores,
        }
    }
}

/// Classifier backed by a hosted text-classification endpoint.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    config: HttpClassifierConfig,
}

impl HttpClassifier {
    pub fn new(config: HttpClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    async fn classify_once(&self, text: &str) -> Result<Vec<LabelScore>, ClassifierError> {
        let url = format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let request = ClassifyRequest {
            inputs: text,
            options: ClassifyOptions {
                wait_for_model: true,
            },
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = &self.config.api_token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<InferenceErrorResponse>(&error_body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or(error_body);

            tracing::error!(code = status.as_u16(), message = %message, "Classifier API error");

            return Err(ClassifierError::Api {
                code: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<ClassifyResponse>().await?.into_scores())
    }
}

#[async_trait]
impl TextClassifier for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifierError> {
        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.config.max_retries);

        let scores = Retry::spawn(retry_strategy, || self.classify_once(text))
            .await
            .map_err(|e| {
                tracing::error!(
                    attempts = self.config.max_retries + 1,
                    error = %e,
                    "All classification attempts failed"
                );
                ClassifierError::RetryExhausted {
                    attempts: self.config.max_retries + 1,
                }
            })?;

        best_label(&scores)
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Configuration union for the classifier factory.
pub enum ClassifierBackendConfig {
    Http(HttpClassifierConfig),
    Onnx(crate::onnx_classifier::OnnxClassifierConfig),
}

pub fn create_classifier(
    config: ClassifierBackendConfig,
) -> Result<Box<dyn TextClassifier>, ClassifierError> {
    match config {
        ClassifierBackendConfig::Http(c) => Ok(Box::new(HttpClassifier::new(c)?)),
        ClassifierBackendConfig::Onnx(c) => {
            Ok(Box::new(crate::onnx_classifier::OnnxClassifier::new(c)?))
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
