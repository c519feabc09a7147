//! Classifier subsystem: builds the configured [`TextClassifier`].

use verity_core::classifier::{
    create_classifier, ClassifierBackendConfig, ClassifierError, HttpClassifierConfig,
    TextClassifier,
};
use verity_core::onnx::resolve_model_paths;
use verity_core::onnx_classifier::{OnnxClassifierConfig, DEFAULT_CLASSIFIER_MODEL};
use verity_core::VerityConfig;

/// Translate `[classifier]` into a backend config.
///
/// The hosted backend reads its bearer token from `HF_API_TOKEN`; an unset
/// or empty variable sends unauthenticated requests.
pub fn backend_config(config: &VerityConfig) -> ClassifierBackendConfig {
    let c = &config.classifier;
    match c.backend.as_str() {
        "onnx" => {
            let (model_path, tokenizer_path) =
                resolve_model_paths(&c.onnx_model_path, DEFAULT_CLASSIFIER_MODEL);
            ClassifierBackendConfig::Onnx(OnnxClassifierConfig {
                model_path,
                tokenizer_path,
                labels: c.labels.clone(),
                feed_token_type_ids: c.feed_token_type_ids,
            })
        }
        other => {
            if other != "http" {
                tracing::warn!(backend = other, "Unknown classifier backend, using http");
            }
            ClassifierBackendConfig::Http(HttpClassifierConfig {
                api_token: std::env::var("HF_API_TOKEN").ok().filter(|t| !t.is_empty()),
                base_url: c.base_url.clone(),
                model: c.model.clone(),
                max_retries: c.max_retries,
                retry_delay_ms: c.retry_delay_ms,
            })
        }
    }
}

pub fn create_classifier_from_config(
    config: &VerityConfig,
) -> Result<Box<dyn TextClassifier>, ClassifierError> {
    create_classifier(backend_config(config))
}
