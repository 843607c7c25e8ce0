//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    provider: Option<&str>,
    model: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let provider_name = provider.unwrap_or(&settings.rag.provider).to_string();

    if let Err(e) = preflight::check(Operation::Ask {
        provider: &provider_name,
    }) {
        Output::error(&format!("{}", e));
        Output::info("Run 'fraga doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let pipeline = Pipeline::new(settings)?;
    let mut engine = pipeline.engine(provider, model)?;

    let spinner = Output::spinner("Searching documentation...");
    let answer = engine.ask(question).await;
    spinner.finish_and_clear();

    match answer {
        Ok(answer) => {
            println!("\n{}\n", answer);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    }
}
