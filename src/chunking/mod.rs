//! Text chunking for breaking documents into searchable segments.
//!
//! Documents are split into overlapping windows that prefer to end on a
//! sentence or line boundary, so retrieved chunks read as coherent prose.

use crate::error::{FragaError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for text chunking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

impl ChunkingConfig {
    /// Validate that this configuration can make forward progress.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FragaError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.overlap >= self.chunk_size {
            return Err(FragaError::Config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Split text into overlapping chunks, preferring sentence boundaries.
///
/// Walks the text in windows of `chunk_size` characters. A window that does
/// not reach the end of the text is truncated to end just after the last `.`
/// or newline, provided that boundary sits past the window's midpoint;
/// otherwise the raw window is kept. The next window starts `overlap`
/// characters before the current one ended.
///
/// Pure function of its inputs: identical arguments yield identical output.
/// Returns an error when `overlap >= chunk_size`, which would prevent the
/// scan from advancing.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    ChunkingConfig { chunk_size, overlap }.validate()?;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Character indexing, not byte indexing, so multi-byte text never
    // splits mid-character.
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let mut end = start + chunk_size;
        let mut slice_end = end.min(chars.len());

        // Try to break at a sentence boundary, but only for windows that
        // don't already reach the end of the text.
        if end < chars.len() {
            let window = &chars[start..slice_end];
            if let Some(break_point) = window.iter().rposition(|&c| c == '.' || c == '\n') {
                if break_point > chunk_size / 2 {
                    end = start + break_point + 1;
                    slice_end = end;
                }
            }
        }

        let chunk: String = chars[start..slice_end].iter().collect();
        let trimmed = chunk.trim();
        if !trimmed.is_empty() {
            chunks.push(trimmed.to_string());
        }

        // A snapped window can end close enough to `start` that subtracting
        // the overlap would stall or move backwards; force forward progress.
        start = end.saturating_sub(overlap).max(start + 1);
    }

    Ok(chunks)
}

/// Split text using a [`ChunkingConfig`].
pub fn chunk_with_config(text: &str, config: &ChunkingConfig) -> Result<Vec<String>> {
    chunk_text(text, config.chunk_size, config.overlap)
}
