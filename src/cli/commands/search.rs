//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::vector_store::ChunkKind;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    kind: Option<&str>,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search) {
        Output::error(&format!("{}", e));
        Output::info("Run 'fraga doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let filter = match kind {
        Some(k) => Some(
            k.parse::<ChunkKind>()
                .map_err(|e| anyhow::anyhow!("{} (expected: content, code, core_code)", e))?,
        ),
        None => None,
    };

    let pipeline = Pipeline::new(settings)?;
    let store = pipeline.vector_store();

    let spinner = Output::spinner("Searching...");
    let results = store.search(query, limit, filter).await;
    spinner.finish_and_clear();

    match results {
        Ok(hits) => {
            if hits.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} result(s)", hits.len()));

                for hit in &hits {
                    Output::search_result(
                        &hit.metadata.title,
                        hit.metadata.kind.as_str(),
                        hit.distance,
                        &hit.content,
                        &hit.metadata.url,
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            Err(e.into())
        }
    }
}
