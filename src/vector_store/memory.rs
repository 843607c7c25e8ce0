//! In-memory vector store implementation.
//!
//! Useful for testing and small corpora. Records are kept in insertion
//! order, which doubles as the tie-break order for equal distances.

use super::{
    build_chunks, cosine_distance, rank_hits, ChunkKind, SearchHit, StoreStats, VectorRecord,
    VectorStore,
};
use crate::chunking::ChunkingConfig;
use crate::ingest::Document;
use crate::embedding::Embedder;
use crate::error::{FragaError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// In-memory vector store.
pub struct MemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    records: RwLock<Vec<VectorRecord>>,
    chunking: ChunkingConfig,
    collection_name: String,
    // Monotonic document counter; keeps record ids unique across batches.
    doc_seq: AtomicUsize,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            records: RwLock::new(Vec::new()),
            chunking: ChunkingConfig::default(),
            collection_name: "product_docs".to_string(),
            doc_seq: AtomicUsize::new(0),
        }
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
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn add_documents(&self, documents: &[Document]) -> Result<usize> {
        let mut added = 0;

        for doc in documents {
            let seq = self.doc_seq.fetch_add(1, Ordering::SeqCst);
            let pending = build_chunks(doc, seq, &self.chunking)?;
            if pending.is_empty() {
                continue;
            }

            // Embed before touching the record list, so a failed document
            // contributes nothing.
            let texts: Vec<String> = pending.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            let indexed_at = Utc::now();
            let mut records = self.records.write().map_err(|e| {
                FragaError::VectorStore(format!("Failed to acquire lock: {}", e))
            })?;
            for (chunk, embedding) in pending.into_iter().zip(embeddings) {
                records.push(VectorRecord {
                    id: chunk.id,
                    text: chunk.text,
                    metadata: chunk.metadata,
                    embedding,
                    indexed_at,
                });
                added += 1;
            }
        }

        info!("Added {} chunks to in-memory store", added);
        Ok(added)
    }

    async fn search(
        &self,
        query: &str,
        n_results: usize,
        filter: Option<ChunkKind>,
    ) -> Result<Vec<SearchHit>> {
        let query_embedding = self.embedder.embed(query).await?;

        let records = self.records.read().map_err(|e| {
            FragaError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let hits: Vec<SearchHit> = records
            .iter()
            .filter(|r| filter.map_or(true, |kind| r.metadata.kind == kind))
            .map(|r| SearchHit {
                content: r.text.clone(),
                metadata: r.metadata.clone(),
                distance: Some(cosine_distance(&query_embedding, &r.embedding)),
            })
            .collect();

        debug!("Scored {} candidate chunks", hits.len());
        Ok(rank_hits(hits, n_results))
    }

    async fn stats(&self) -> Result<StoreStats> {
        let records = self.records.read().map_err(|e| {
            FragaError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;
        Ok(StoreStats {
            total_chunks: records.len(),
            collection_name: self.collection_name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::chunk_text;
    use crate::embedding::testing::LetterFrequencyEmbedder;
    use crate::ingest::DocumentKind;

    fn store() -> MemoryVectorStore {
        MemoryVectorStore::new(Arc::new(LetterFrequencyEmbedder))
    }

    fn sample_doc() -> Document {
        Document {
            title: "Customization guide".to_string(),
            url: "https://docs.example.com/custom".to_string(),
            content: "Fields can be extended. Events can be hooked. Layouts can change."
                .to_string(),
            code_examples: vec![
                "let handler = Form::on_save(|f| f.validate());".to_string(),
            ],
            kind: DocumentKind::Content,
        }
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let store = store();
        let added = store.add_documents(&[sample_doc()]).await.unwrap();

        // One content chunk (short text) plus one code example.
        assert_eq!(added, 2);
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_chunks, 2);
        assert_eq!(stats.collection_name, "product_docs");
    }

    #[tokio::test]
    async fn test_ids_stay_unique_across_batches() {
        let store = store();
        store.add_documents(&[sample_doc()]).await.unwrap();
        store.add_documents(&[sample_doc()]).await.unwrap();

        let records = store.records.read().unwrap();
        let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), records.len());
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_empty() {
        let hits = store().search("anything", 5, None).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_filter_never_leaks_other_kinds() {
        let store = store();
        store.add_documents(&[sample_doc()]).await.unwrap();

        let hits = store
            .search("form handler", 10, Some(ChunkKind::Code))
            .await
            .unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.metadata.kind == ChunkKind::Code));

        // A filter matching nothing is an empty result, not an error.
        let hits = store
            .search("form handler", 10, Some(ChunkKind::CoreCode))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_search_orders_by_ascending_distance() {
        let store = store();
        store.add_documents(&[sample_doc()]).await.unwrap();

        let hits = store.search("extended fields layouts", 10, None).await.unwrap();
        assert!(hits.len() >= 2);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[tokio::test]
    async fn test_end_to_end_ingest_scenario() {
        let store = store().with_chunking(ChunkingConfig {
            chunk_size: 100,
            overlap: 20,
        });

        let content = "Sentence one. Sentence two. ".repeat(10);
        let doc = Document {
            title: "T".to_string(),
            url: String::new(),
            content: content.clone(),
            code_examples: vec!["def f(): pass".repeat(3)],
            kind: DocumentKind::Content,
        };

        let added = store.add_documents(&[doc]).await.unwrap();
        let expected_content = chunk_text(&content, 100, 20).unwrap().len();
        assert_eq!(added, expected_content + 1);
        assert_eq!(store.stats().await.unwrap().total_chunks, expected_content + 1);

        let hits = store
            .search("Sentence", 5, Some(ChunkKind::Content))
            .await
            .unwrap();
        assert!(!hits.is_empty());
        assert!(hits[0].content.contains("Sentence"));
    }
}
