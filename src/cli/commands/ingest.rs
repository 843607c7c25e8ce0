//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;

/// Run the ingest command.
pub async fn run_ingest(path: &str, core_code: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest) {
        Output::error(&format!("{}", e));
        Output::info("Run 'fraga doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(settings)?;
    let path = Path::new(path);

    let spinner = Output::spinner("Ingesting documents...");

    let report = if core_code {
        pipeline.ingest_source_file(path).await
    } else {
        pipeline.ingest_path(path).await
    };
    spinner.finish_and_clear();

    match report {
        Ok(report) => {
            if report.documents == 0 {
                Output::warning("No documents found to ingest.");
            } else {
                Output::success(&format!(
                    "Ingested {} document(s) as {} chunks",
                    report.documents, report.chunks_added
                ));
                let stats = pipeline.vector_store().stats().await?;
                Output::kv("Total chunks", &stats.total_chunks.to_string());
                Output::kv("Collection", &stats.collection_name);
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            Err(e.into())
        }
    }
}
