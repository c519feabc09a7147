pub mod assessor;
pub mod classifier;
pub mod config;
pub mod corpus;
pub mod db;
pub mod embeddings;
pub mod error;
pub mod fusion;
pub mod models;
pub mod onnx;
pub mod onnx_classifier;
pub mod onnx_embedder;
pub mod recommend;
pub mod retriever;

pub use assessor::{AssessError, AssessorConfig, CredibilityAssessor};
pub use classifier::{
    create_classifier, ClassifierBackendConfig, ClassifierError, HttpClassifier,
    HttpClassifierConfig, TextClassifier,
};
pub use config::VerityConfig;
pub use embeddings::{
    create_backend, BackendConfig, EmbeddingBackend, EmbeddingError, HttpEmbeddingClient,
    HttpEmbeddingConfig, OnnxConfig, ONNX_DIMENSIONS,
};
pub use error::VerityError;
pub use models::{
    ClassificationResult, ConfidenceBucket, Label, ReferenceRecord, SimilarityMatch, Verdict,
};
pub use onnx_classifier::{OnnxClassifier, OnnxClassifierConfig};
pub use onnx_embedder::OnnxEmbeddingClient;
pub use retriever::{MemoryRetriever, RetrieverError, SimilarityRetriever};
