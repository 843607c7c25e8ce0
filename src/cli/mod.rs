//! CLI module for Fraga.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;
pub(crate) use output::format_size;

use clap::{Parser, Subcommand};

/// Fraga - Documentation Q&A
///
/// A CLI tool for retrieval-augmented Q&A over product documentation.
/// The name "Fraga" comes from the Swedish word for "question."
#[derive(Parser, Debug)]
#[command(name = "fraga")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Fraga and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Ingest documents into the index
    Ingest {
        /// JSON file or directory of JSON files, or a source file with --core-code
        path: String,

        /// Treat the input as product source code instead of exported documents
        #[arg(long)]
        core_code: bool,
    },

    /// Ask a question and get an answer from the documentation
    Ask {
        /// The question to ask
        question: String,

        /// LLM provider to use (openai, anthropic)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model to use for response generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Start an interactive chat session
    Chat {
        /// LLM provider to use (openai, anthropic)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model to use for response generation
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Search the index for relevant chunks
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Restrict to one chunk kind (content, code, core_code)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Show index statistics
    Stats,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Open configuration file in editor
    Edit,
}
