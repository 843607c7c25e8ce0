//! Vector store abstraction for Fraga.
//!
//! Provides a trait-based interface for different vector index backends.
//! Stores own the full record lifecycle: they chunk documents, derive
//! embeddings through an [`Embedder`], and answer filtered similarity
//! queries. Callers never supply embeddings directly.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::{read_stats, SqliteVectorStore};

use crate::chunking::{chunk_with_config, ChunkingConfig};
use crate::error::Result;
use crate::ingest::{Document, DocumentKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix applied to code-example records so they are retrievable as
/// standalone units.
pub const CODE_EXAMPLE_PREFIX: &str = "Code example:";

/// Code examples at or below this length (in characters) are dropped as
/// too short to be worth retrieving.
pub const MIN_CODE_EXAMPLE_LEN: usize = 20;

/// The kind tag carried by every stored chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    /// A chunk of prose documentation.
    Content,
    /// A standalone code example.
    Code,
    /// A chunk of the product's own source code.
    CoreCode,
}

impl ChunkKind {
    /// Stable string form, used in record ids and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Content => "content",
            ChunkKind::Code => "code",
            ChunkKind::CoreCode => "core_code",
        }
    }
}

impl std::str::FromStr for ChunkKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "content" => Ok(ChunkKind::Content),
            "code" => Ok(ChunkKind::Code),
            "core_code" => Ok(ChunkKind::CoreCode),
            _ => Err(format!("Unknown chunk kind: {}", s)),
        }
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<DocumentKind> for ChunkKind {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Content => ChunkKind::Content,
            DocumentKind::CoreCode => ChunkKind::CoreCode,
        }
    }
}

/// Metadata carried by every stored chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Title of the source document.
    pub title: String,
    /// Source locator (URL or file path). May be empty.
    pub url: String,
    /// Chunk kind.
    pub kind: ChunkKind,
    /// Position of this chunk within its document and kind.
    pub index: usize,
}

/// A record stored in the vector index.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    /// Record id, `doc_{sequence}_{kind}_{index}`.
    pub id: String,
    /// Chunk text.
    pub text: String,
    /// Chunk metadata.
    pub metadata: RecordMetadata,
    /// Embedding vector, derived by the store.
    pub embedding: Vec<f32>,
    /// When this record was indexed.
    pub indexed_at: DateTime<Utc>,
}

/// A search result, a read-only projection of a stored record.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Chunk text.
    pub content: String,
    /// Chunk metadata.
    pub metadata: RecordMetadata,
    /// Cosine distance to the query (lower is more similar).
    pub distance: Option<f32>,
}

/// Summary statistics about a store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    /// Total number of stored chunks.
    pub total_chunks: usize,
    /// Name of the collection.
    pub collection_name: String,
}

/// Trait for vector store implementations.
///
/// Search results are ordered by ascending cosine distance; ties keep
/// insertion order. An empty store or a filter matching nothing yields an
/// empty result set, not an error.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Chunk, embed, and store a batch of documents. Returns the number of
    /// chunks added. Each document is ingested atomically: all of its
    /// chunks are stored, or none.
    async fn add_documents(&self, documents: &[Document]) -> Result<usize>;

    /// Search for chunks similar to `query`, optionally restricted to one
    /// chunk kind.
    async fn search(
        &self,
        query: &str,
        n_results: usize,
        filter: Option<ChunkKind>,
    ) -> Result<Vec<SearchHit>>;

    /// Get summary statistics.
    async fn stats(&self) -> Result<StoreStats>;
}

/// A chunk produced from a document, before embedding.
#[derive(Debug, Clone)]
pub(crate) struct PendingChunk {
    pub id: String,
    pub text: String,
    pub metadata: RecordMetadata,
}

/// Build the chunk set for one document.
///
/// Content is split with the configured chunker and tagged with the
/// document's kind. Code examples longer than [`MIN_CODE_EXAMPLE_LEN`]
/// become one record each, prefixed and never chunked further.
pub(crate) fn build_chunks(
    doc: &Document,
    doc_seq: usize,
    config: &ChunkingConfig,
) -> Result<Vec<PendingChunk>> {
    let mut pending = Vec::new();
    let content_kind = ChunkKind::from(doc.kind);

    for (i, chunk) in chunk_with_config(&doc.content, config)?.into_iter().enumerate() {
        pending.push(PendingChunk {
            id: format!("doc_{}_{}_{}", doc_seq, content_kind.as_str(), i),
            text: chunk,
            metadata: RecordMetadata {
                title: doc.title.clone(),
                url: doc.url.clone(),
                kind: content_kind,
                index: i,
            },
        });
    }

    for (j, code) in doc.code_examples.iter().enumerate() {
        if code.chars().count() <= MIN_CODE_EXAMPLE_LEN {
            continue;
        }
        pending.push(PendingChunk {
            id: format!("doc_{}_{}_{}", doc_seq, ChunkKind::Code.as_str(), j),
            text: format!("{}\n{}", CODE_EXAMPLE_PREFIX, code),
            metadata: RecordMetadata {
                title: doc.title.clone(),
                url: doc.url.clone(),
                kind: ChunkKind::Code,
                index: j,
            },
        });
    }

    Ok(pending)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Cosine distance, the similarity metric exposed to callers.
///
/// `1 - cosine_similarity`, so identical directions are distance 0 and
/// results sort most-similar-first in ascending order.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Sort hits by ascending distance, preserving insertion order on ties,
/// then cap at `n_results`.
pub(crate) fn rank_hits(mut hits: Vec<SearchHit>, n_results: usize) -> Vec<SearchHit> {
    hits.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(n_results);
    hits
}
