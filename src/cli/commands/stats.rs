//! Stats command implementation.

use crate::cli::{format_size, Output};
use crate::config::Settings;
use crate::vector_store;
use anyhow::Result;

/// Run the stats command.
///
/// Reads the database directly so statistics stay available without any
/// API credentials configured.
pub async fn run_stats(settings: Settings) -> Result<()> {
    let db_path = settings.sqlite_path();
    let stats = vector_store::read_stats(&db_path, &settings.vector_store.collection_name)?;

    Output::header("Index Statistics");
    Output::kv("Collection", &stats.collection_name);
    Output::kv("Total chunks", &stats.total_chunks.to_string());

    if db_path.exists() {
        if let Ok(meta) = std::fs::metadata(&db_path) {
            Output::kv(
                "Database",
                &format!("{} ({})", db_path.display(), format_size(meta.len())),
            );
        }
    } else {
        Output::kv("Database", &format!("{} (not created yet)", db_path.display()));
    }

    Ok(())
}
