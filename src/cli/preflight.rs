//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials are available before starting
//! operations that would otherwise fail midway. Commands that don't need
//! an LLM keep working when only the embedding key is present, so a
//! missing provider credential degrades the tool to ingestion and search
//! rather than making it refuse to start.

use crate::error::{FragaError, Result};
use crate::llm;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Ingestion requires the embedding backend.
    Ingest,
    /// Search requires the embedding backend.
    Search,
    /// Asking requires the embedding backend and an LLM provider.
    Ask { provider: &'a str },
    /// Statistics have no external requirements.
    Stats,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>) -> Result<()> {
    match operation {
        Operation::Ingest | Operation::Search => {
            check_embedding_key()?;
        }
        Operation::Ask { provider } => {
            check_embedding_key()?;
            check_provider_credential(provider)?;
        }
        Operation::Stats => {
            // No external requirements
        }
    }
    Ok(())
}

/// Check if the embedding API key is configured.
fn check_embedding_key() -> Result<()> {
    if crate::embedding::probe() {
        Ok(())
    } else {
        Err(FragaError::Config(
            "OPENAI_API_KEY not set (required for embeddings). Set it with: export OPENAI_API_KEY='sk-...'"
                .to_string(),
        ))
    }
}

/// Check if the selected LLM provider's credential is configured.
fn check_provider_credential(name: &str) -> Result<()> {
    let config = llm::provider_config(name).ok_or_else(|| {
        FragaError::Config(format!("Unknown LLM provider '{}'", name))
    })?;

    if llm::probe(name) {
        Ok(())
    } else {
        Err(FragaError::Config(format!(
            "{} not set (required for the '{}' provider). Set it with: export {}='...'",
            config.credential_var, name, config.credential_var
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_has_no_requirements() {
        assert!(check(Operation::Stats).is_ok());
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = check_provider_credential("nope").unwrap_err();
        assert!(err.to_string().contains("Unknown LLM provider"));
    }
}
