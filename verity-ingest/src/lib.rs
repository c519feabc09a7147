//! Reference corpus ingestion into pgvector.
//!
//! Creates the `reference_articles` table and fills it with embedded,
//! labeled articles. A record that fails to embed or insert is logged and
//! counted; it never aborts the rest of the batch.

use futures::stream::{self, StreamExt};
use pgvector::Vector;
use serde::Serialize;
use sqlx::PgPool;
use std::future::Future;
use thiserror::Error;
use verity_core::embeddings::{EmbeddingBackend, EmbeddingError};
use verity_core::models::ReferenceRecord;

pub const REFERENCE_TABLE: &str = "reference_articles";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Embedding has {actual} dimensions, table expects {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Vector dimensions must be between 1 and 16000, got {0}")]
    InvalidDimensions(usize),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub failed: usize,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.inserted + self.failed
    }
}

/// DDL for the reference table and its cosine HNSW index.
pub fn schema_statements(dimensions: usize) -> Result<Vec<String>, IngestError> {
    // pgvector's hard limit for the vector type
    if dimensions == 0 || dimensions > 16_000 {
        return Err(IngestError::InvalidDimensions(dimensions));
    }
    Ok(vec![
        "CREATE EXTENSION IF NOT EXISTS vector".to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS {REFERENCE_TABLE} (
                id UUID PRIMARY KEY,
                content TEXT NOT NULL,
                label TEXT NOT NULL CHECK (label IN ('real', 'fake')),
                embedding vector({dimensions}) NOT NULL
            )"
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS {REFERENCE_TABLE}_embedding_idx
                ON {REFERENCE_TABLE} USING hnsw (embedding vector_cosine_ops)"
        ),
    ])
}

/// Create the extension, table and index if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool, dimensions: usize) -> Result<(), IngestError> {
    for statement in schema_statements(dimensions)? {
        sqlx::query(&statement).execute(pool).await?;
    }
    tracing::info!(table = REFERENCE_TABLE, dimensions, "Reference schema ready");
    Ok(())
}

/// Embed one record and upsert it by id.
pub async fn ingest_record(
    pool: &PgPool,
    backend: &dyn EmbeddingBackend,
    record: &ReferenceRecord,
) -> Result<(), IngestError> {
    let embedding = backend.embed(&record.text).await?;
    if embedding.len() != backend.dimensions() {
        return Err(IngestError::DimensionMismatch {
            expected: backend.dimensions(),
            actual: embedding.len(),
        });
    }

    sqlx::query(
        r#"
        INSERT INTO reference_articles (id, content, label, embedding)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE
            SET content = EXCLUDED.content,
                label = EXCLUDED.label,
                embedding = EXCLUDED.embedding
        "#,
    )
    .bind(record.id)
    .bind(&record.text)
    .bind(record.label.as_str())
    .bind(Vector::from(embedding))
    .execute(pool)
    .await?;

    Ok(())
}

/// Ingest every record with at most `concurrency` in flight.
pub async fn ingest_corpus(
    pool: &PgPool,
    backend: &dyn EmbeddingBackend,
    records: Vec<ReferenceRecord>,
    concurrency: usize,
) -> IngestReport {
    let total = records.len();
    tracing::info!(
        records = total,
        concurrency,
        backend = backend.name(),
        "Starting corpus ingest"
    );

    let report = process_records(records, concurrency, |record| async move {
        let result = ingest_record(pool, backend, &record).await;
        (record, result)
    })
    .await;

    tracing::info!(
        inserted = report.inserted,
        failed = report.failed,
        "Corpus ingest finished"
    );
    report
}

/// Drive `op` over `records` and tally the outcomes.
async fn process_records<F, Fut>(
    records: Vec<ReferenceRecord>,
    concurrency: usize,
    op: F,
) -> IngestReport
where
    F: FnMut(ReferenceRecord) -> Fut,
    Fut: Future<Output = (ReferenceRecord, Result<(), IngestError>)>,
{
    stream::iter(records)
        .map(op)
        .buffer_unordered(concurrency.max(1))
        .fold(IngestReport::default(), |mut report, (record, result)| async move {
            match result {
                Ok(()) => report.inserted += 1,
                Err(e) => {
                    tracing::warn!(id = %record.id, error = %e, "Failed to ingest reference record");
                    report.failed += 1;
                }
            }
            report
        })
        .await
}
