//! Error types for Fraga.

use thiserror::Error;

/// Library-level error type for Fraga operations.
///
/// Construction-time problems surface as `Config` (missing credential or bad
/// setting) or `CapabilityUnavailable` (an optional backend is absent).
/// `Provider` is the transient failure class raised by LLM backends during
/// generation; the RAG engine converts it into an answer-shaped apology
/// instead of propagating it.
#[derive(Error, Debug)]
pub enum FragaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error("LLM provider error: {0}")]
    Provider(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector store error: {0}")]
    VectorStore(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

/// Result type alias for Fraga operations.
pub type Result<T> = std::result::Result<T, FragaError>;
