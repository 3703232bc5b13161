use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "doclassify")]
#[command(
    author,
    version,
    about = "Classify documents against a remote model, with abstention"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "doclassify.yaml")]
    pub config: PathBuf,

    /// Inference endpoint URL
    #[arg(short, long, global = true, env = "DOCLASSIFY_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a document
    Classify {
        /// Document text; read from --file or stdin when omitted
        text: Option<String>,

        /// Read the document from a file
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,

        /// Number of ranked labels to show
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Abstain when confidence is below this value
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Request timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the inference service is up
    Health,
}
