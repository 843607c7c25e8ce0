//! Pipeline wiring for Fraga.
//!
//! Builds the embedder, vector store, and RAG engine from settings, and
//! coordinates document ingestion. This is the construction point where
//! missing credentials and absent backends surface as errors, before any
//! component is handed out.

use crate::chunking::ChunkingConfig;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{FragaError, Result};
use crate::ingest::{self, Document, DocumentKind};
use crate::llm;
use crate::rag::{ContextAssembler, RagEngine};
use crate::vector_store::{MemoryVectorStore, SqliteVectorStore, VectorStore};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Summary of one ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    /// Documents accepted.
    pub documents: usize,
    /// Chunks added to the store.
    pub chunks_added: usize,
}

/// The main pipeline for Fraga.
pub struct Pipeline {
    settings: Settings,
    prompts: Prompts,
    vector_store: Arc<dyn VectorStore>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Create a new pipeline from settings.
    ///
    /// Fails fast when the embedding backend is unavailable or the
    /// configured store provider is unknown.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let chunking = ChunkingConfig {
            chunk_size: settings.chunking.chunk_size,
            overlap: settings.chunking.overlap,
        };
        chunking.validate()?;

        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        )?);

        let vector_store: Arc<dyn VectorStore> = match settings.vector_store.provider.as_str() {
            "sqlite" => Arc::new(
                SqliteVectorStore::new(&settings.sqlite_path(), embedder)?
                    .with_chunking(chunking)
                    .with_collection_name(&settings.vector_store.collection_name),
            ),
            "memory" => Arc::new(
                MemoryVectorStore::new(embedder)
                    .with_chunking(chunking)
                    .with_collection_name(&settings.vector_store.collection_name),
            ),
            other => {
                return Err(FragaError::Config(format!(
                    "Unknown vector store provider: {}",
                    other
                )))
            }
        };

        Ok(Self {
            settings,
            prompts,
            vector_store,
        })
    }

    /// Get a handle to the vector store.
    pub fn vector_store(&self) -> Arc<dyn VectorStore> {
        self.vector_store.clone()
    }

    /// Ingest documents from a JSON file or directory.
    #[instrument(skip(self))]
    pub async fn ingest_path(&self, path: &Path) -> Result<IngestReport> {
        let documents = ingest::load_documents(path)?;
        self.ingest_documents(&documents).await
    }

    /// Ingest a plain source file as a core-code document.
    #[instrument(skip(self))]
    pub async fn ingest_source_file(&self, path: &Path) -> Result<IngestReport> {
        let doc = Document::from_source_file(path, DocumentKind::CoreCode)?;
        self.ingest_documents(&[doc]).await
    }

    /// Ingest an already-loaded document batch.
    pub async fn ingest_documents(&self, documents: &[Document]) -> Result<IngestReport> {
        if documents.is_empty() {
            return Ok(IngestReport { documents: 0, chunks_added: 0 });
        }

        let chunks_added = self.vector_store.add_documents(documents).await?;
        info!(
            "Ingested {} documents as {} chunks",
            documents.len(),
            chunks_added
        );

        Ok(IngestReport {
            documents: documents.len(),
            chunks_added,
        })
    }

    /// Build a RAG engine, selecting the LLM provider by name.
    ///
    /// `provider` and `model` override the configured defaults. Fails with
    /// a configuration error when the provider is unknown or its
    /// credential is missing.
    pub fn engine(&self, provider: Option<&str>, model: Option<&str>) -> Result<RagEngine> {
        let provider_name = provider.unwrap_or(&self.settings.rag.provider);
        let model = model.or(self.settings.rag.model.as_deref());
        let provider = llm::create_provider(provider_name, model)?;

        let assembler = ContextAssembler::new(self.vector_store.clone())
            .with_limits(
                self.settings.rag.content_results,
                self.settings.rag.code_results,
                self.settings.rag.core_code_results,
            )
            .with_excerpt_budget(self.settings.rag.max_excerpt_tokens);

        Ok(RagEngine::new(assembler, provider)
            .with_prompts(self.prompts.clone())
            .with_history_turns(self.settings.rag.history_turns))
    }
}
