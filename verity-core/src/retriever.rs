//! Similarity retriever boundary — nearest labeled articles for a text.
//!
//! The production backend is pgvector (see `verity-server`); this module
//! holds the trait and an in-memory backend for small corpora and tests.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::embeddings::{EmbeddingBackend, EmbeddingError};
use crate::models::{ReferenceRecord, SimilarityMatch};

#[async_trait]
pub trait SimilarityRetriever: Send + Sync {
    /// Up to `k` corpus entries ordered by descending similarity.
    async fn search(&self, text: &str, k: usize) -> Result<Vec<SimilarityMatch>, RetrieverError>;

    /// Backend name for logging and health output.
    fn name(&self) -> &str;
}

#[derive(Error, Debug)]
pub enum RetrieverError {
    #[error("Query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corpus dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Cosine similarity of two equal-length vectors; 0 when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na.sqrt() * nb.sqrt())
}

struct EmbeddedRecord {
    record: ReferenceRecord,
    vector: Vec<f32>,
}

/// Exact cosine scan over a corpus held in memory.
///
/// Fine for a few thousand articles; the full reference corpus belongs in
/// pgvector.
pub struct MemoryRetriever {
    backend: Arc<dyn EmbeddingBackend>,
    entries: Arc<[EmbeddedRecord]>,
}

impl MemoryRetriever {
    /// Embed every record once up front.
    pub async fn build(
        backend: Arc<dyn EmbeddingBackend>,
        records: Vec<ReferenceRecord>,
    ) -> Result<Self, RetrieverError> {
        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let vector = backend.embed(&record.text).await?;
            if vector.len() != backend.dimensions() {
                return Err(RetrieverError::DimensionMismatch {
                    expected: backend.dimensions(),
                    actual: vector.len(),
                });
            }
            entries.push(EmbeddedRecord { record, vector });
        }

        tracing::info!(
            backend = backend.name(),
            records = entries.len(),
            "Built in-memory reference index"
        );

        Ok(Self {
            backend,
            entries: entries.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl SimilarityRetriever for MemoryRetriever {
    async fn search(&self, text: &str, k: usize) -> Result<Vec<SimilarityMatch>, RetrieverError> {
        let query = self.backend.embed(text).await?;

        let mut scored: Vec<(f64, &EmbeddedRecord)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(&query, &e.vector), e))
            .collect();
        // Stable sort keeps corpus order among equal scores.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(score, e)| SimilarityMatch::new(e.record.text.clone(), e.record.label, score))
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::Label;

    /// Deterministic bag-of-words embedder: each lowercase word bumps one of
    /// 64 buckets chosen by a byte-sum hash.
    pub(crate) struct WordBucketEmbedder;

    #[async_trait]
    impl EmbeddingBackend for WordBucketEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
            let mut v = vec![0.0f32; 64];
            for word in text.split_whitespace() {
                let word = word.to_lowercase();
                let bucket = word.bytes().map(usize::from).sum::<usize>() % 64;
                v[bucket] += 1.0;
            }
            Ok(v)
        }

        fn dimensions(&self) -> usize {
            64
        }

        fn name(&self) -> &str {
            "word-bucket"
        }
    }

    fn corpus() -> Vec<ReferenceRecord> {
        vec![
            ReferenceRecord::new("vaccine contains tracking microchips", Label::Fake),
            ReferenceRecord::new("central bank raises interest rates", Label::Real),
            ReferenceRecord::new("microchips found in vaccine vials claims celebrity", Label::Fake),
            ReferenceRecord::new("city council approves new budget", Label::Real),
        ]
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-12);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_memory_search_orders_by_similarity() {
        let retriever = MemoryRetriever::build(Arc::new(WordBucketEmbedder), corpus())
            .await
            .unwrap();
        assert_eq!(retriever.len(), 4);

        let matches = retriever
            .search("vaccine contains tracking microchips", 3)
            .await
            .unwrap();

        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].text, "vaccine contains tracking microchips");
        assert_eq!(matches[0].label, Label::Fake);
        assert!((matches[0].score - 1.0).abs() < 1e-9);
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_memory_search_k_larger_than_corpus() {
        let retriever = MemoryRetriever::build(Arc::new(WordBucketEmbedder), corpus())
            .await
            .unwrap();
        let matches = retriever.search("budget", 10).await.unwrap();
        assert_eq!(matches.len(), 4);
    }

    #[tokio::test]
    async fn test_memory_search_is_deterministic() {
        let retriever = MemoryRetriever::build(Arc::new(WordBucketEmbedder), corpus())
            .await
            .unwrap();
        let a = retriever.search("new interest rates", 4).await.unwrap();
        let b = retriever.search("new interest rates", 4).await.unwrap();
        assert_eq!(a, b);
    }
}
