//! ONNX embedding backend — local sentence vectors via `all-MiniLM-L6-v2`
//!
//! Produces 384-dimensional, L2-normalized embeddings entirely offline, the
//! same model the reference corpus is indexed with.

use async_trait::async_trait;
use ort::session::Session;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;

use crate::embeddings::{EmbeddingBackend, EmbeddingError, OnnxConfig};
use crate::onnx;

/// File stem used when no embedding model path is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";

/// Local ONNX embedding client.
pub struct OnnxEmbeddingClient {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    dimensions: usize,
}

impl std::fmt::Debug for OnnxEmbeddingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingClient")
            .field("dimensions", &self.dimensions)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingClient {
    /// Load the model and tokenizer named in `config`.
    pub fn new(config: OnnxConfig) -> Result<Self, EmbeddingError> {
        for path in [&config.model_path, &config.tokenizer_path] {
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound {
                    path: path.display().to_string(),
                });
            }
        }

        let session =
            onnx::load_session(&config.model_path).map_err(EmbeddingError::OnnxInference)?;
        let tokenizer =
            onnx::load_tokenizer(&config.tokenizer_path).map_err(EmbeddingError::Tokenizer)?;

        tracing::info!(
            model = %config.model_path.display(),
            dimensions = config.dimensions,
            "Loaded ONNX embedding model"
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            dimensions: config.dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OnnxEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        // ONNX inference is CPU-bound — run on the blocking thread pool.
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let dimensions = self.dimensions;
        let text = text.to_string();

        tokio::task::spawn_blocking(move || {
            let encoded = onnx::encode(&tokenizer, &text).map_err(EmbeddingError::Tokenizer)?;
            let output = {
                let mut guard = session.lock().map_err(|e| {
                    EmbeddingError::OnnxInference(format!("session lock poisoned: {e}"))
                })?;
                onnx::run(&mut guard, &encoded, true).map_err(EmbeddingError::OnnxInference)?
            };
            pool_and_normalize(&output.shape, &output.data, &encoded.attention_mask, dimensions)
        })
        .await
        .map_err(|e| EmbeddingError::OnnxInference(format!("spawn_blocking join error: {e}")))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "onnx"
    }
}

/// Mean-pool a `[1, seq_len, hidden]` hidden state over the attention mask,
/// then L2-normalize.
fn pool_and_normalize(
    shape: &[i64],
    data: &[f32],
    attention_mask: &[i64],
    expected_dims: usize,
) -> Result<Vec<f32>, EmbeddingError> {
    if shape.len() != 3 {
        return Err(EmbeddingError::OnnxInference(format!(
            "Expected 3D output, got {}D",
            shape.len()
        )));
    }
    let seq_len = shape[1] as usize;
    let hidden = shape[2] as usize;

    let mut pooled = vec![0.0f32; hidden];
    let mut mask_sum = 0.0f32;

    for (tok_idx, &mask) in attention_mask.iter().enumerate().take(seq_len) {
        if mask == 0 {
            continue;
        }
        mask_sum += 1.0;
        let row = &data[tok_idx * hidden..(tok_idx + 1) * hidden];
        for (acc, v) in pooled.iter_mut().zip(row) {
            *acc += v;
        }
    }

    if mask_sum > 0.0 {
        pooled.iter_mut().for_each(|v| *v /= mask_sum);
    }

    let norm: f32 = pooled.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        pooled.iter_mut().for_each(|v| *v /= norm);
    }

    if pooled.len() != expected_dims {
        return Err(EmbeddingError::InvalidDimensions {
            expected: expected_dims,
            actual: pooled.len(),
        });
    }

    Ok(pooled)
}
