//! Embedding subsystem: builds the configured [`EmbeddingBackend`].
//!
//! Queries and the reference corpus must go through the same model, so both
//! the retriever and `--ingest` take their backend from here.

use verity_core::embeddings::{
    create_backend, BackendConfig, EmbeddingBackend, EmbeddingError, HttpEmbeddingConfig,
    OnnxConfig,
};
use verity_core::onnx::resolve_model_paths;
use verity_core::onnx_embedder::DEFAULT_EMBEDDING_MODEL;
use verity_core::VerityConfig;

/// Translate `[embedding]` into a backend config.
pub fn backend_config(config: &VerityConfig) -> BackendConfig {
    let c = &config.embedding;
    match c.backend.as_str() {
        "http" => BackendConfig::Http(HttpEmbeddingConfig {
            api_token: std::env::var("HF_API_TOKEN").ok().filter(|t| !t.is_empty()),
            base_url: c.base_url.clone(),
            model: c.model.clone(),
            dimensions: c.dimensions as usize,
            max_retries: c.max_retries,
            retry_delay_ms: c.retry_delay_ms,
        }),
        other => {
            if other != "onnx" {
                tracing::warn!(backend = other, "Unknown embedding backend, using onnx");
            }
            let (model_path, tokenizer_path) =
                resolve_model_paths(&c.onnx_model_path, DEFAULT_EMBEDDING_MODEL);
            BackendConfig::Onnx(OnnxConfig {
                model_path,
                tokenizer_path,
                dimensions: c.dimensions as usize,
            })
        }
    }
}

pub fn create_backend_from_config(
    config: &VerityConfig,
) -> Result<Box<dyn EmbeddingBackend>, EmbeddingError> {
    create_backend(backend_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_selects_onnx_minilm() {
        match backend_config(&VerityConfig::default()) {
            BackendConfig::Onnx(c) => {
                assert_eq!(c.dimensions, 384);
                let name = c.model_path.file_name().and_then(|n| n.to_str());
                assert_eq!(name, Some("all-MiniLM-L6-v2.onnx"));
            }
            BackendConfig::Http(_) => panic!("Expected onnx backend"),
        }
    }

    #[test]
    fn test_http_backend_config() {
        let mut config = VerityConfig::default();
        config.embedding.backend = "http".to_string();
        config.embedding.base_url = "http://localhost:9000".to_string();

        match backend_config(&config) {
            BackendConfig::Http(c) => {
                assert_eq!(c.base_url, "http://localhost:9000");
                assert_eq!(c.model, "sentence-transformers/all-MiniLM-L6-v2");
                assert_eq!(c.dimensions, 384);
            }
            BackendConfig::Onnx(_) => panic!("Expected http backend"),
        }
    }
}
