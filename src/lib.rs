//! Fraga - Documentation Q&A
//!
//! A CLI tool for retrieval-augmented question answering over product
//! documentation exports.
//!
//! The name "Fraga" comes from the Swedish word for "question."
//!
//! # Overview
//!
//! Fraga allows you to:
//! - Ingest exported documentation (JSON) and product source code
//! - Build a searchable vector index from documentation, code examples,
//!   and core source code
//! - Ask questions and get AI-powered answers grounded in the index
//! - Search through the index semantically
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `ingest` - Document loading from JSON exports and source files
//! - `chunking` - Overlapping text chunking
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction (SQLite, in-memory)
//! - `llm` - LLM provider abstraction (OpenAI, Anthropic)
//! - `rag` - Context assembly and the conversational engine
//! - `pipeline` - Component wiring and ingestion coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use fraga::config::Settings;
//! use fraga::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     // Ingest a documentation export, then ask a question
//!     pipeline.ingest_path(std::path::Path::new("docs.json")).await?;
//!
//!     let mut engine = pipeline.engine(None, None)?;
//!     let answer = engine.ask("How do I add a custom field?").await?;
//!     println!("{}", answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod llm;
pub mod pipeline;
pub mod rag;
pub mod vector_store;

pub use error::{FragaError, Result};
