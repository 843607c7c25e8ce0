//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(
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

    println!("\n{}", style("Fraga Chat").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, or 'exit' to quit. Use 'clear' to reset conversation, 'stats' for index statistics.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            // EOF
            println!();
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            engine.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        if input.eq_ignore_ascii_case("stats") {
            let stats = pipeline.vector_store().stats().await?;
            Output::kv("Collection", &stats.collection_name);
            Output::kv("Total chunks", &stats.total_chunks.to_string());
            Output::kv("History turns", &engine.history_len().to_string());
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let answer = engine.ask(input).await;
        spinner.finish_and_clear();

        match answer {
            Ok(answer) => {
                println!("\n{} {}\n", style("Fraga:").cyan().bold(), answer);
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
