//! CLI definitions for kbharvest.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::provider::SearchType;

/// Harvest literature observations for registry resources.
#[derive(Parser, Debug)]
#[command(name = "kbharvest", version, about = "Knowledge-base observation harvester")]
pub struct Cli {
    /// Config file (defaults to ~/.kbharvest/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level unless KBHARVEST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract observations for every resource in the registry
    Run(RunArgs),
    /// Extract observations for a single resource and print them
    Extract(ExtractArgs),
    /// Query the knowledge base directly
    Retrieve(RetrieveArgs),
}

/// Arguments for `kbharvest run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Registry CSV export
    #[arg(long)]
    pub registry: Option<PathBuf>,

    /// Resume at this resource id
    #[arg(long)]
    pub resume_from: Option<String>,

    /// Process at most this many resources
    #[arg(long)]
    pub limit: Option<usize>,

    /// Skip resources that already have an artifact
    #[arg(long)]
    pub skip_existing: bool,

    /// Turn ceiling per resource
    #[arg(long)]
    pub max_turns: Option<usize>,

    /// Directory for observation files
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Retries per agent call
    #[arg(long, default_value_t = 0)]
    pub retries: u32,
}

/// Arguments for `kbharvest extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Resource name
    #[arg(long)]
    pub name: String,

    /// Resource type, e.g. "Cell Line"
    #[arg(long = "type", default_value = "")]
    pub resource_type: String,

    /// Registry id (a placeholder is used when omitted)
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub rrid: Option<String>,

    #[arg(long)]
    pub synonyms: Option<String>,

    /// Turn ceiling
    #[arg(long)]
    pub max_turns: Option<usize>,
}

/// Arguments for `kbharvest retrieve`.
#[derive(Args, Debug)]
pub struct RetrieveArgs {
    /// Free-text query
    pub query: String,

    /// Number of references to return
    #[arg(long)]
    pub limit: Option<u32>,

    /// hybrid or semantic
    #[arg(long, default_value = "hybrid")]
    pub search_type: SearchType,

    /// Have a foundation model answer from the retrieved references
    #[arg(long)]
    pub generate: bool,

    /// Continue an earlier generation session
    #[arg(long, requires = "generate")]
    pub session_id: Option<String>,

    /// Foundation model for --generate (overrides KBHARVEST_MODEL_ID)
    #[arg(long, requires = "generate")]
    pub model_id: Option<String>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
