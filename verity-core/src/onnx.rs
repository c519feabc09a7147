//! Shared ONNX Runtime plumbing for the local embedder and classifier.
//!
//! Both models are BERT-family encoders fed a single tokenized sequence
//! (batch size 1). The embedder pools the last hidden state; the classifier
//! reads the logits.

use ort::session::Session;
use ort::value::Tensor;
use std::path::{Path, PathBuf};
use tokenizers::{Tokenizer, TruncationParams};

/// Longest token sequence passed to either model.
pub const MAX_SEQ_LEN: usize = 512;

/// Token ids for one input text.
pub(crate) struct EncodedText {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
}

/// Raw model output copied out of the session: shape plus flat data.
pub(crate) struct ModelOutput {
    pub shape: Vec<i64>,
    pub data: Vec<f32>,
}

pub(crate) fn load_session(model_path: &Path) -> Result<Session, String> {
    Session::builder()
        .and_then(|b| b.with_intra_threads(1))
        .and_then(|b| b.commit_from_file(model_path))
        .map_err(|e| e.to_string())
}

pub(crate) fn load_tokenizer(tokenizer_path: &Path) -> Result<Tokenizer, String> {
    let mut tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| e.to_string())?;
    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_SEQ_LEN,
            ..Default::default()
        }))
        .map_err(|e| e.to_string())?;
    Ok(tokenizer)
}

pub(crate) fn encode(tokenizer: &Tokenizer, text: &str) -> Result<EncodedText, String> {
    let encoding = tokenizer.encode(text, true).map_err(|e| e.to_string())?;

    Ok(EncodedText {
        input_ids: encoding.get_ids().iter().map(|&id| id as i64).collect(),
        attention_mask: encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect(),
        token_type_ids: encoding.get_type_ids().iter().map(|&t| t as i64).collect(),
    })
}

/// Run one forward pass and return the first output tensor.
///
/// DistilBERT exports take no `token_type_ids` input, so it is only fed when
/// `feed_token_type_ids` is set.
pub(crate) fn run(
    session: &mut Session,
    encoded: &EncodedText,
    feed_token_type_ids: bool,
) -> Result<ModelOutput, String> {
    let shape = vec![1i64, encoded.input_ids.len() as i64];

    let input_ids = Tensor::from_array((shape.clone(), encoded.input_ids.clone()))
        .map_err(|e| e.to_string())?;
    let attention_mask = Tensor::from_array((shape.clone(), encoded.attention_mask.clone()))
        .map_err(|e| e.to_string())?;

    let outputs = if feed_token_type_ids {
        let token_type_ids = Tensor::from_array((shape, encoded.token_type_ids.clone()))
            .map_err(|e| e.to_string())?;
        session.run(ort::inputs! {
            "input_ids" => input_ids,
            "attention_mask" => attention_mask,
            "token_type_ids" => token_type_ids,
        })
    } else {
        session.run(ort::inputs! {
            "input_ids" => input_ids,
            "attention_mask" => attention_mask,
        })
    }
    .map_err(|e| e.to_string())?;

    let (out_shape, data) = outputs[0]
        .try_extract_tensor::<f32>()
        .map_err(|e| e.to_string())?;

    Ok(ModelOutput {
        shape: out_shape.iter().copied().collect(),
        data: data.to_vec(),
    })
}

/// Resolve the default model directory.
pub fn default_model_dir() -> PathBuf {
    let data_home = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".local/share")
        });
    data_home.join("verity/models")
}

/// Resolve paths for an ONNX model and its tokenizer.
///
/// An empty `configured` path falls back to `<default_model_dir>/<default_stem>.onnx`.
/// The tokenizer always sits next to the model as `<stem>-tokenizer.json`.
pub fn resolve_model_paths(configured: &str, default_stem: &str) -> (PathBuf, PathBuf) {
    let model = if configured.is_empty() {
        default_model_dir().join(format!("{default_stem}.onnx"))
    } else {
        PathBuf::from(shellexpand::tilde(configured).into_owned())
    };

    let stem = model
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let tokenizer = model.with_file_name(format!("{stem}-tokenizer.json"));
    (model, tokenizer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_model_dir_contains_verity() {
        let dir = default_model_dir();
        assert!(
            dir.to_string_lossy().contains("verity/models"),
            "Expected verity/models in path, got: {}",
            dir.display()
        );
    }

    #[test]
    fn test_resolve_model_paths_default() {
        let (model, tokenizer) = resolve_model_paths("", "all-MiniLM-L6-v2");
        assert!(model.to_string_lossy().ends_with("all-MiniLM-L6-v2.onnx"));
        assert!(tokenizer
            .to_string_lossy()
            .ends_with("all-MiniLM-L6-v2-tokenizer.json"));
    }

    #[test]
    fn test_resolve_model_paths_custom() {
        let (model, tokenizer) = resolve_model_paths("/opt/models/fake-news.onnx", "unused");
        assert_eq!(model, PathBuf::from("/opt/models/fake-news.onnx"));
        assert_eq!(
            tokenizer,
            PathBuf::from("/opt/models/fake-news-tokenizer.json")
        );
    }

    #[test]
    fn test_resolve_model_paths_expands_tilde() {
        let (model, _) = resolve_model_paths("~/models/clf.onnx", "unused");
        assert!(!model.to_string_lossy().starts_with('~'));
        assert!(model.to_string_lossy().ends_with("models/clf.onnx"));
    }
}
