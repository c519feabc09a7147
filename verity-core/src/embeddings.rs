//! Embeddings module for Verity — sentence vectors for similarity search
//!
//! Provides an `EmbeddingBackend` trait with implementations for:
//! - **ONNX** — local embeddings via `all-MiniLM-L6-v2` (384-dim)
//! - **HTTP** — hosted feature-extraction endpoint (Hugging Face Inference API layout)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::Retry;

/// Default ONNX (all-MiniLM-L6-v2) embedding dimensions
pub const ONNX_DIMENSIONS: usize = 384;

// ============================================================================
// EmbeddingBackend trait
// ============================================================================

/// Abstraction over embedding providers.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Returns the embedding dimension (e.g., 384).
    fn dimensions(&self) -> usize;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

/// Embedding generation errors
#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Invalid response: expected {expected} dimensions, got {actual}")]
    InvalidDimensions { expected: usize, actual: usize },

    #[error("Missing embedding in response")]
    MissingEmbedding,

    #[error("All {attempts} retry attempts failed")]
    RetryExhausted { attempts: usize },

    #[error("ONNX model not found at {path}")]
    ModelNotFound { path: String },

    #[error("ONNX inference error: {0}")]
    OnnxInference(String),

    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

// ============================================================================
// Config types
// ============================================================================

/// Hosted embedding endpoint configuration
#[derive(Debug, Clone)]
pub struct HttpEmbeddingConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub max_retries: usize,
    pub retry_delay_ms: u64,
}

/// ONNX backend configuration
#[derive(Debug, Clone)]
pub struct OnnxConfig {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
    pub dimensions: usize,
}

/// Configuration union for the backend factory.
pub enum BackendConfig {
    Http(HttpEmbeddingConfig),
    Onnx(OnnxConfig),
}

/// Create the appropriate backend from configuration.
pub fn create_backend(config: BackendConfig) -> Result<Box<dyn EmbeddingBackend>, EmbeddingError> {
    match config {
        BackendConfig::Http(c) => Ok(Box::new(HttpEmbeddingClient::new(c)?)),
        BackendConfig::Onnx(c) => {
            Ok(Box::new(crate::onnx_embedder::OnnxEmbeddingClient::new(c)?))
        }
    }
}

// ============================================================================
// Feature-extraction API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct FeatureRequest<'a> {
    inputs: &'a str,
    options: FeatureOptions,
}

#[derive(Debug, Serialize)]
struct FeatureOptions {
    wait_for_model: bool,
}

/// Sentence-transformer pipelines return a flat vector; some deployments
/// wrap it in a batch dimension.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureResponse {
    Flat(Vec<f32>),
    Batched(Vec<Vec<f32>>),
}

impl FeatureResponse {
    fn into_vector(self) -> Option<Vec<f32>> {
        match self {
            FeatureResponse::Flat(v) => Some(v),
            FeatureResponse::Batched(mut rows) => {
                if rows.is_empty() {
                    None
                } else {
                    Some(rows.swap_remove(0))
                }
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct InferenceErrorResponse {
    pub(crate) error: Option<String>,
}

// ============================================================================
// HttpEmbeddingClient
// ============================================================================

/// Embedding client for a hosted feature-extraction endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmbeddingClient {
    client: Client,
    config: HttpEmbeddingConfig,
}

impl HttpEmbeddingClient {
    pub fn new(config: HttpEmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, config })
    }

    /// Generate an embedding, retrying transient failures with backoff.
    pub async fn embed_raw(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let retry_strategy = ExponentialBackoff::from_millis(self.config.retry_delay_ms)
            .max_delay(Duration::from_secs(10))
            .map(jitter)
            .take(self.config.max_retries);

        let result = Retry::spawn(retry_strategy, || self.embed_once(text)).await;

        match result {
            Ok(vec) => Ok(vec),
            Err(e) => {
                tracing::error!(
                    attempts = self.config.max_retries + 1,
                    error = %e,
                    "All embedding attempts failed"
                );
                Err(EmbeddingError::RetryExhausted {
                    attempts: self.config.max_retries + 1,
                })
            }
        }
    }

    async fn embed_once(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!(
            "{}/models/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );

        let request = FeatureRequest {
            inputs: text,
            options: FeatureOptions {
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

            tracing::error!(code = status.as_u16(), message = %message, "Embedding API error");

            return Err(EmbeddingError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let values = response
            .json::<FeatureResponse>()
            .await?
            .into_vector()
            .ok_or(EmbeddingError::MissingEmbedding)?;

        if values.len() != self.config.dimensions {
            return Err(EmbeddingError::InvalidDimensions {
                expected: self.config.dimensions,
                actual: values.len(),
            });
        }

        Ok(values)
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_raw(text).await
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn name(&self) -> &str {
        "http"
    }
}

// ============================================================================
// TESTS
// ============================================================================
