//! Context retrieval and formatting for RAG prompts.

use crate::error::Result;
use crate::vector_store::{ChunkKind, SearchHit, VectorStore};
use std::sync::Arc;
use tracing::debug;

/// Estimated characters per token, used to convert the excerpt token
/// budget into a character cap.
const CHARS_PER_TOKEN: usize = 4;

/// Retrieved context for one query, bucketed by chunk kind.
#[derive(Debug, Clone, Default)]
pub struct RetrievedContext {
    /// Prose documentation hits.
    pub content: Vec<SearchHit>,
    /// Code example hits.
    pub code: Vec<SearchHit>,
    /// Product source code hits.
    pub core_code: Vec<SearchHit>,
}

impl RetrievedContext {
    /// True when no bucket holds any hits.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.code.is_empty() && self.core_code.is_empty()
    }
}

/// Runs filtered searches against the vector store and renders the results
/// as a single context block for the prompt.
pub struct ContextAssembler {
    store: Arc<dyn VectorStore>,
    content_results: usize,
    code_results: usize,
    core_code_results: usize,
    max_excerpt_tokens: usize,
}

impl ContextAssembler {
    /// Create an assembler with default result counts.
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self {
            store,
            content_results: 5,
            code_results: 3,
            core_code_results: 3,
            max_excerpt_tokens: 125,
        }
    }

    /// Set how many hits to retrieve per bucket.
    pub fn with_limits(mut self, content: usize, code: usize, core_code: usize) -> Self {
        self.content_results = content;
        self.code_results = code;
        self.core_code_results = core_code;
        self
    }

    /// Set the excerpt budget in estimated tokens.
    pub fn with_excerpt_budget(mut self, max_tokens: usize) -> Self {
        self.max_excerpt_tokens = max_tokens;
        self
    }

    /// Retrieve context for a query: three independent filtered searches,
    /// one per chunk kind.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievedContext> {
        let content = self
            .store
            .search(query, self.content_results, Some(ChunkKind::Content))
            .await?;
        let code = self
            .store
            .search(query, self.code_results, Some(ChunkKind::Code))
            .await?;
        let core_code = self
            .store
            .search(query, self.core_code_results, Some(ChunkKind::CoreCode))
            .await?;

        debug!(
            "Retrieved {} content, {} code, {} core_code hits",
            content.len(),
            code.len(),
            core_code.len()
        );

        Ok(RetrievedContext { content, code, core_code })
    }

    /// Render retrieved context as a prompt block.
    ///
    /// Sections appear in a fixed order and empty buckets are omitted
    /// entirely, so the output never contains a header with nothing under
    /// it. Documentation and source excerpts are capped by the token
    /// budget; code examples are always included in full.
    pub fn format(&self, context: &RetrievedContext) -> String {
        let mut formatted = Vec::new();
        let excerpt_chars = self.max_excerpt_tokens * CHARS_PER_TOKEN;

        if !context.content.is_empty() {
            formatted.push("=== Relevant Documentation ===\n".to_string());
            for (i, hit) in context.content.iter().enumerate() {
                formatted.push(format!("{}. {}", i + 1, hit.metadata.title));
                if !hit.metadata.url.is_empty() {
                    formatted.push(format!("   Source: {}", hit.metadata.url));
                }
                formatted.push(format!("   {}\n", excerpt(&hit.content, excerpt_chars)));
            }
        }

        if !context.code.is_empty() {
            formatted.push("\n=== Relevant Code Examples ===\n".to_string());
            for (i, hit) in context.code.iter().enumerate() {
                formatted.push(format!("{}. From: {}", i + 1, hit.metadata.title));
                formatted.push(format!("   {}\n", hit.content));
            }
        }

        if !context.core_code.is_empty() {
            formatted.push("\n=== Relevant Core Source Code ===\n".to_string());
            for (i, hit) in context.core_code.iter().enumerate() {
                formatted.push(format!("{}. {}", i + 1, hit.metadata.title));
                if !hit.metadata.url.is_empty() {
                    formatted.push(format!("   Source: {}", hit.metadata.url));
                }
                formatted.push(format!("   {}\n", excerpt(&hit.content, excerpt_chars)));
            }
        }

        formatted.join("\n")
    }
}

/// Cap text at `max_chars` characters, appending an ellipsis marker when
/// truncated. Cuts on character boundaries, never mid-codepoint.
fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let capped: String = text.chars().take(max_chars).collect();
        format!("{}...", capped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::LetterFrequencyEmbedder;
    use crate::ingest::{Document, DocumentKind};
    use crate::vector_store::{MemoryVectorStore, RecordMetadata};

    fn hit(kind: ChunkKind, title: &str, content: &str) -> SearchHit {
        SearchHit {
            content: content.to_string(),
            metadata: RecordMetadata {
                title: title.to_string(),
                url: "https://docs.example.com/page".to_string(),
                kind,
                index: 0,
            },
            distance: Some(0.1),
        }
    }

    fn assembler() -> ContextAssembler {
        let store = Arc::new(MemoryVectorStore::new(Arc::new(LetterFrequencyEmbedder)));
        ContextAssembler::new(store)
    }

    #[test]
    fn test_empty_context_formats_to_empty_string() {
        let formatted = assembler().format(&RetrievedContext::default());
        assert!(formatted.is_empty());
        assert!(!formatted.contains("==="));
    }

    #[test]
    fn test_empty_buckets_omit_their_sections() {
        let context = RetrievedContext {
            content: vec![hit(ChunkKind::Content, "Guide", "Prose text.")],
            code: Vec::new(),
            core_code: Vec::new(),
        };
        let formatted = assembler().format(&context);
        assert!(formatted.contains("=== Relevant Documentation ==="));
        assert!(!formatted.contains("Code Examples"));
        assert!(!formatted.contains("Core Source Code"));
    }

    #[test]
    fn test_sections_appear_in_fixed_order() {
        let context = RetrievedContext {
            content: vec![hit(ChunkKind::Content, "Guide", "Prose.")],
            code: vec![hit(ChunkKind::Code, "Guide", "Code example:\nfn a() {}")],
            core_code: vec![hit(ChunkKind::CoreCode, "form.rs", "struct Form;")],
        };
        let formatted = assembler().format(&context);
        let docs = formatted.find("Relevant Documentation").unwrap();
        let code = formatted.find("Relevant Code Examples").unwrap();
        let core = formatted.find("Relevant Core Source Code").unwrap();
        assert!(docs < code && code < core);
    }

    #[test]
    fn test_documentation_excerpts_are_capped_code_is_not() {
        let long = "x".repeat(2000);
        let context = RetrievedContext {
            content: vec![hit(ChunkKind::Content, "Guide", &long)],
            code: vec![hit(ChunkKind::Code, "Guide", &long)],
            core_code: Vec::new(),
        };
        let formatted = assembler().format(&context);

        // Default budget: 125 tokens -> 500 characters, then the marker.
        assert!(formatted.contains(&format!("{}...", "x".repeat(500))));
        assert!(!formatted.contains(&"x".repeat(501)));
        // The code section carries the full text.
        let code_section = formatted.split("Code Examples").nth(1).unwrap();
        assert!(code_section.contains(&"x".repeat(2000)));
    }

    #[test]
    fn test_short_excerpt_has_no_ellipsis() {
        assert_eq!(excerpt("short text", 500), "short text");
        assert_eq!(excerpt(&"y".repeat(501), 500), format!("{}...", "y".repeat(500)));
    }

    #[tokio::test]
    async fn test_retrieve_buckets_by_kind() {
        let store = Arc::new(MemoryVectorStore::new(Arc::new(LetterFrequencyEmbedder)));
        store
            .add_documents(&[
                Document {
                    title: "Fields".to_string(),
                    url: String::new(),
                    content: "Custom fields extend entities.".to_string(),
                    code_examples: vec!["entity.add_field(Field::text(\"notes\"))".to_string()],
                    kind: DocumentKind::Content,
                },
                Document {
                    title: "entity.rs".to_string(),
                    url: String::new(),
                    content: "pub struct Entity { fields: Vec<Field> }".to_string(),
                    code_examples: Vec::new(),
                    kind: DocumentKind::CoreCode,
                },
            ])
            .await
            .unwrap();

        let context = ContextAssembler::new(store)
            .retrieve("custom fields")
            .await
            .unwrap();

        assert_eq!(context.content.len(), 1);
        assert_eq!(context.code.len(), 1);
        assert_eq!(context.core_code.len(), 1);
        assert!(context.content.iter().all(|h| h.metadata.kind == ChunkKind::Content));
        assert!(context.code.iter().all(|h| h.metadata.kind == ChunkKind::Code));
        assert!(context.core_code.iter().all(|h| h.metadata.kind == ChunkKind::CoreCode));
    }
}
