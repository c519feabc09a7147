//! Retrieval subsystem: nearest reference articles from pgvector.
//!
//! - Embeds the submission with the same backend the corpus was ingested with
//! - Orders `reference_articles` by cosine distance (`<=>`)
//! - Score = 1 - cosine distance, clamped to [0, 1]

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use pgvector::Vector;
use sqlx::PgPool;
use verity_core::embeddings::EmbeddingBackend;
use verity_core::retriever::{MemoryRetriever, RetrieverError, SimilarityRetriever};
use verity_core::{Label, SimilarityMatch, VerityConfig};

/// Similarity retriever over the `reference_articles` table.
pub struct PgVectorRetriever {
    pool: PgPool,
    backend: Arc<dyn EmbeddingBackend>,
}

impl PgVectorRetriever {
    pub fn new(pool: PgPool, backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { pool, backend }
    }
}

/// Map a stored row onto a match. Unknown labels are skipped.
fn row_to_match(content: String, label: &str, distance: Option<f64>) -> Option<SimilarityMatch> {
    let label: Label = match label.parse() {
        Ok(l) => l,
        Err(_) => {
            tracing::warn!(label, "Skipping reference row with unknown label");
            return None;
        }
    };
    let score = 1.0 - distance.unwrap_or(1.0);
    Some(SimilarityMatch::new(content, label, score))
}

#[async_trait]
impl SimilarityRetriever for PgVectorRetriever {
    async fn search(&self, text: &str, k: usize) -> Result<Vec<SimilarityMatch>, RetrieverError> {
        let embedding = self.backend.embed(text).await?;
        if embedding.len() != self.backend.dimensions() {
            return Err(RetrieverError::DimensionMismatch {
                expected: self.backend.dimensions(),
                actual: embedding.len(),
            });
        }
        let vector = Vector::from(embedding);

        let rows = sqlx::query_as::<_, (String, String, Option<f64>)>(
            r#"
            SELECT
                content,
                label,
                (embedding <=> $1::vector)::float8 AS distance
            FROM reference_articles
            ORDER BY embedding <=> $1::vector
            LIMIT $2
            "#,
        )
        .bind(&vector)
        .bind(k as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(content, label, distance)| row_to_match(content, &label, distance))
            .collect())
    }

    fn name(&self) -> &str {
        "pgvector"
    }
}

/// Build the retriever named by `[retrieval] backend`.
///
/// `memory` loads and embeds `corpus_path` at startup; anything else uses
/// pgvector and needs `pool`.
pub async fn build_retriever(
    config: &VerityConfig,
    pool: Option<PgPool>,
    backend: Arc<dyn EmbeddingBackend>,
) -> anyhow::Result<Arc<dyn SimilarityRetriever>> {
    match config.retrieval.backend.as_str() {
        "memory" => {
            if config.retrieval.corpus_path.is_empty() {
                anyhow::bail!("retrieval.backend = \"memory\" requires retrieval.corpus_path");
            }
            let path = shellexpand::tilde(&config.retrieval.corpus_path).into_owned();
            let records = verity_core::corpus::load_corpus(Path::new(&path))
                .with_context(|| format!("Failed to load corpus from {path}"))?;
            let retriever = MemoryRetriever::build(backend, records).await?;
            if retriever.is_empty() {
                tracing::warn!(path = %path, "Reference corpus is empty; agreement will always be 0");
            }
            Ok(Arc::new(retriever))
        }
        _ => {
            let pool = pool.context("pgvector retrieval requires a database connection")?;
            Ok(Arc::new(PgVectorRetriever::new(pool, backend)))
        }
    }
}
