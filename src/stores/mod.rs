//! Persistent vector storage for article chunks.
//!
//! [`VectorBackend`] abstracts the on-disk index; [`SqliteChunkStore`] is the
//! shipped implementation (SQLite + sqlite-vec). [`ArticleIndex`] is the
//! gateway the rest of the application talks to: it owns the embedding step
//! on both the write path (`add`) and the read path (`retrieve`).

pub mod lifecycle;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingestion::Chunk;
use crate::llm::embeddings::EmbeddingProvider;
use crate::types::RagError;

pub use lifecycle::{DELETION_MARKER, StartupCleanup, mark_for_deletion, resolve_pending_deletion};
pub use sqlite::SqliteChunkStore;

/// A chunk in its persisted form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Unique identifier for this chunk.
    pub id: String,
    /// Source URL of the originating article.
    pub url: String,
    /// Zero-based index of this chunk within its source document.
    pub chunk_index: usize,
    /// The chunk text.
    pub content: String,
    /// The embedding vector (if computed).
    pub embedding: Option<Vec<f32>>,
}

impl ChunkRecord {
    pub fn new(
        id: impl Into<String>,
        url: impl Into<String>,
        chunk_index: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            chunk_index,
            content: content.into(),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Storage backend for chunk records and their embeddings.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    /// Insert chunk records; records without embeddings are rejected.
    async fn insert_chunks(&self, chunks: Vec<ChunkRecord>) -> Result<(), RagError>;

    /// Nearest-neighbor search by cosine similarity, most similar first,
    /// limited to `top_k` results. Each hit carries its similarity score.
    async fn search_similar(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(ChunkRecord, f32)>, RagError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<usize, RagError>;
}

/// The vector store gateway: embedding provider + storage backend.
pub struct ArticleIndex<B: VectorBackend> {
    backend: B,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl<B: VectorBackend> ArticleIndex<B> {
    pub fn new(backend: B, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { backend, embedder }
    }

    /// Embeds and persists chunks; returns the number stored.
    ///
    /// Safe to call repeatedly over the process lifetime — this is a running
    /// index, not a one-shot build.
    pub async fn add(&self, chunks: Vec<Chunk>) -> Result<usize, RagError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::Embedding(format!(
                "provider returned {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut per_url: HashMap<String, usize> = HashMap::new();
        let records: Vec<ChunkRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                let index = per_url.entry(chunk.source_url.clone()).or_insert(0);
                let record = ChunkRecord::new(
                    Uuid::new_v4().to_string(),
                    chunk.source_url,
                    *index,
                    chunk.text,
                )
                .with_embedding(embedding);
                *index += 1;
                record
            })
            .collect();

        let stored = records.len();
        self.backend.insert_chunks(records).await?;
        Ok(stored)
    }

    /// Embeds the query and returns the `top_k` most similar chunks.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<(ChunkRecord, f32)>, RagError> {
        let query_embedding = self.embedder.embed_single(query).await?;
        self.backend.search_similar(&query_embedding, top_k).await
    }

    pub async fn count(&self) -> Result<usize, RagError> {
        self.backend.count().await
    }
}
