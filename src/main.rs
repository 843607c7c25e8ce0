//! Fraga CLI entry point.

use anyhow::Result;
use clap::Parser;
use fraga::cli::{commands, Cli, Commands};
use fraga::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("fraga={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings)?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Ingest { path, core_code } => {
            commands::run_ingest(path, *core_code, settings).await?;
        }

        Commands::Ask {
            question,
            provider,
            model,
        } => {
            commands::run_ask(question, provider.as_deref(), model.as_deref(), settings).await?;
        }

        Commands::Chat { provider, model } => {
            commands::run_chat(provider.as_deref(), model.as_deref(), settings).await?;
        }

        Commands::Search { query, limit, kind } => {
            commands::run_search(query, *limit, kind.as_deref(), settings).await?;
        }

        Commands::Stats => {
            commands::run_stats(settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
