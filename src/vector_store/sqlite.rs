//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine distance computed in Rust for simplicity. The
//! kind filter is pushed into the SQL predicate so a filtered search only
//! scores matching rows. For large corpora consider the sqlite-vec
//! extension or a dedicated vector database.

use super::{
    build_chunks, cosine_distance, rank_hits, ChunkKind, RecordMetadata, SearchHit, StoreStats,
    VectorStore,
};
use crate::chunking::ChunkingConfig;
use crate::ingest::Document;
use crate::embedding::Embedder;
use crate::error::{FragaError, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    kind TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    content TEXT NOT NULL,
    embedding BLOB NOT NULL,
    indexed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_kind ON chunks(kind);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    collection_name: String,
    doc_seq: AtomicUsize,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store at the given path.
    #[instrument(skip_all)]
    pub fn new(path: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        let doc_seq = read_doc_seq(&conn)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            chunking: ChunkingConfig::default(),
            collection_name: "product_docs".to_string(),
            doc_seq: AtomicUsize::new(doc_seq),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory(embedder: Arc<dyn Embedder>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
            embedder,
            chunking: ChunkingConfig::default(),
            collection_name: "product_docs".to_string(),
            doc_seq: AtomicUsize::new(0),
        })
    }

    /// Set the chunking configuration.
    pub fn with_chunking(mut self, chunking: ChunkingConfig) -> Self {
        self.chunking = chunking;
        self
    }

    /// Set the collection name reported by [`VectorStore::stats`].
    pub fn with_collection_name(mut self, name: &str) -> Self {
        self.collection_name = name.to_string();
        self
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

/// Read statistics from an existing database without constructing a store.
///
/// Used by commands that only report on the index and must keep working
/// when no embedding credential is present.
pub fn read_stats(path: &Path, collection_name: &str) -> Result<StoreStats> {
    if !path.exists() {
        return Ok(StoreStats {
            total_chunks: 0,
            collection_name: collection_name.to_string(),
        });
    }

    let conn = Connection::open(path)?;
    conn.execute_batch(SCHEMA)?;

    let total_chunks: i64 = conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;

    Ok(StoreStats {
        total_chunks: total_chunks as usize,
        collection_name: collection_name.to_string(),
    })
}

/// Read the persisted document sequence counter, defaulting to zero.
fn read_doc_seq(conn: &Connection) -> Result<usize> {
    let value: Option<String> = conn
        .query_row("SELECT value FROM meta WHERE key = 'doc_seq'", [], |row| {
            row.get(0)
        })
        .optional()?;

    Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0))
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn add_documents(&self, documents: &[Document]) -> Result<usize> {
        let mut added = 0;

        for doc in documents {
            let seq = self.doc_seq.fetch_add(1, Ordering::SeqCst);
            let pending = build_chunks(doc, seq, &self.chunking)?;
            if pending.is_empty() {
                continue;
            }

            let texts: Vec<String> = pending.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;
            let indexed_at = Utc::now().to_rfc3339();

            let conn = self.conn.lock().map_err(|e| {
                FragaError::VectorStore(format!("Failed to acquire lock: {}", e))
            })?;

            // One transaction per document: either all of its chunks land
            // or none do. Statements are issued in bounded batches to keep
            // each round of binds small.
            let tx = conn.unchecked_transaction()?;
            for batch in pending.chunks(100).zip(embeddings.chunks(100)) {
                let (chunks, vectors) = batch;
                for (chunk, embedding) in chunks.iter().zip(vectors.iter()) {
                    tx.execute(
                        r#"
                        INSERT OR REPLACE INTO chunks
                        (id, title, url, kind, chunk_index, content, embedding, indexed_at)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                        "#,
                        params![
                            chunk.id,
                            chunk.metadata.title,
                            chunk.metadata.url,
                            chunk.metadata.kind.as_str(),
                            chunk.metadata.index as i64,
                            chunk.text,
                            Self::embedding_to_bytes(embedding),
                            indexed_at,
                        ],
                    )?;
                    added += 1;
                }
            }
            tx.execute(
                "INSERT OR REPLACE INTO meta (key, value) VALUES ('doc_seq', ?1)",
                params![(seq + 1).to_string()],
            )?;
            tx.commit()?;

            debug!("Ingested document {:?} as {} chunks", doc.title, pending.len());
        }

        info!("Added {} chunks to SQLite store", added);
        Ok(added)
    }

    #[instrument(skip(self, query))]
    async fn search(
        &self,
        query: &str,
        n_results: usize,
        filter: Option<ChunkKind>,
    ) -> Result<Vec<SearchHit>> {
        let query_embedding = self.embedder.embed(query).await?;

        let conn = self.conn.lock().map_err(|e| {
            FragaError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        // rowid order is insertion order, which becomes the tie-break for
        // equal distances.
        let mut stmt = conn.prepare(
            r#"
            SELECT title, url, kind, chunk_index, content, embedding
            FROM chunks
            WHERE (?1 IS NULL OR kind = ?1)
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map(params![filter.map(|k| k.as_str())], |row| {
            let kind_str: String = row.get(2)?;
            let index: i64 = row.get(3)?;
            let embedding_bytes: Vec<u8> = row.get(5)?;

            Ok((
                RecordMetadata {
                    title: row.get(0)?,
                    url: row.get(1)?,
                    kind: kind_str.parse().unwrap_or(ChunkKind::Content),
                    index: index as usize,
                },
                row.get::<_, String>(4)?,
                Self::bytes_to_embedding(&embedding_bytes),
            ))
        })?;

        let mut hits = Vec::new();
        for row in rows {
            let (metadata, content, embedding) = row?;
            hits.push(SearchHit {
                content,
                metadata,
                distance: Some(cosine_distance(&query_embedding, &embedding)),
            });
        }

        Ok(rank_hits(hits, n_results))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock().map_err(|e| {
            FragaError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let total_chunks: i64 =
            conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))?;

        Ok(StoreStats {
            total_chunks: total_chunks as usize,
            collection_name: self.collection_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::LetterFrequencyEmbedder;
    use crate::ingest::DocumentKind;

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(LetterFrequencyEmbedder)
    }

    fn sample_doc() -> Document {
        Document {
            title: "Events".to_string(),
            url: "https://docs.example.com/events".to_string(),
            content: "Events fire before and after save. Handlers run in order.".to_string(),
            code_examples: vec!["fn on_save(ev: &Event) { ev.abort_if_invalid(); }".to_string()],
            kind: DocumentKind::Content,
        }
    }

    #[tokio::test]
    async fn test_add_search_stats() {
        let store = SqliteVectorStore::in_memory(embedder()).unwrap();
        let added = store.add_documents(&[sample_doc()]).await.unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.stats().await.unwrap().total_chunks, 2);

        let hits = store.search("events save handlers", 5, None).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[tokio::test]
    async fn test_filter_pushed_into_query() {
        let store = SqliteVectorStore::in_memory(embedder()).unwrap();
        store.add_documents(&[sample_doc()]).await.unwrap();

        let hits = store
            .search("save", 10, Some(ChunkKind::Code))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].metadata.kind, ChunkKind::Code);

        let hits = store
            .search("save", 10, Some(ChunkKind::CoreCode))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_search_is_empty() {
        let store = SqliteVectorStore::in_memory(embedder()).unwrap();
        assert!(store.search("anything", 5, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_doc_seq_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");

        {
            let store = SqliteVectorStore::new(&path, embedder()).unwrap();
            store.add_documents(&[sample_doc()]).await.unwrap();
        }

        let store = SqliteVectorStore::new(&path, embedder()).unwrap();
        store.add_documents(&[sample_doc()]).await.unwrap();

        // Second document got a fresh sequence, so nothing was overwritten.
        assert_eq!(store.stats().await.unwrap().total_chunks, 4);
    }
}
