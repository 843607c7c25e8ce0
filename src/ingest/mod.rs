//! Document model and file ingestion.
//!
//! Documents normally arrive from an external acquisition tool (a crawler or
//! exporter) as JSON. This module defines the document shape the pipeline
//! accepts and loads document batches from disk. Fraga performs no network
//! access of its own during ingestion.

use crate::error::{FragaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// The kind of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Prose documentation.
    #[default]
    Content,
    /// Source code of the product itself.
    CoreCode,
}

/// A normalized unit of ingested content.
///
/// Immutable once handed to the pipeline; the vector store derives chunks
/// and embeddings from it but never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Page or file title.
    pub title: String,
    /// Source locator (page URL or file path). May be empty.
    #[serde(default)]
    pub url: String,
    /// Full text content.
    pub content: String,
    /// Standalone code examples extracted from the document.
    #[serde(default)]
    pub code_examples: Vec<String>,
    /// Document kind, controls how content chunks are tagged.
    #[serde(default)]
    pub kind: DocumentKind,
}

impl Document {
    /// Wrap a plain source/text file as a document.
    ///
    /// Used to index core source code directly, without going through an
    /// external acquisition tool.
    pub fn from_source_file(path: &Path, kind: DocumentKind) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            title,
            url: path.display().to_string(),
            content,
            code_examples: Vec::new(),
            kind,
        })
    }
}

/// Load documents from a JSON file or a directory of JSON files.
///
/// A file must contain a JSON array of documents. For a directory, every
/// `*.json` file is loaded; files that fail to parse are skipped with a
/// warning, since upstream acquisition may leave partial exports behind.
pub fn load_documents(path: &Path) -> Result<Vec<Document>> {
    if path.is_dir() {
        let mut documents = Vec::new();
        let mut entries: Vec<_> = std::fs::read_dir(path)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        entries.sort();

        for entry in entries {
            match load_document_file(&entry) {
                Ok(mut docs) => documents.append(&mut docs),
                Err(e) => warn!("Skipping unreadable document file {:?}: {}", entry, e),
            }
        }
        Ok(documents)
    } else {
        load_document_file(path)
    }
}

/// Load a single JSON file containing an array of documents.
fn load_document_file(path: &Path) -> Result<Vec<Document>> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| {
        FragaError::Ingestion(format!("{}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_document_kind_defaults_to_content() {
        let doc: Document = serde_json::from_str(
            r#"{"title": "T", "content": "Some text."}"#,
        )
        .unwrap();
        assert_eq!(doc.kind, DocumentKind::Content);
        assert!(doc.url.is_empty());
        assert!(doc.code_examples.is_empty());
    }

    #[test]
    fn test_load_documents_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"[{{"title": "A", "url": "https://example.com/a", "content": "Alpha.",
                 "code_examples": ["fn a() {{}}"]}},
                {{"title": "B", "content": "Beta.", "kind": "core_code"}}]"#
        )
        .unwrap();

        let docs = load_documents(&path).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].title, "A");
        assert_eq!(docs[1].kind, DocumentKind::CoreCode);
    }

    #[test]
    fn test_load_documents_from_dir_skips_malformed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("good.json"),
            r#"[{"title": "G", "content": "Good."}]"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("ignored.txt"), "not a json file").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "G");
    }

    #[test]
    fn test_malformed_single_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "nonsense").unwrap();
        assert!(load_documents(&path).is_err());
    }

    #[test]
    fn test_from_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("module.rs");
        std::fs::write(&path, "pub fn entry() {}").unwrap();

        let doc = Document::from_source_file(&path, DocumentKind::CoreCode).unwrap();
        assert_eq!(doc.title, "module.rs");
        assert_eq!(doc.kind, DocumentKind::CoreCode);
        assert!(doc.content.contains("entry"));
    }
}
