//! Command-line argument definitions

use clap::Parser;
use std::path::PathBuf;

/// Transform JSON documents with a declarative mapping configuration
#[derive(Parser, Debug)]
#[command(name = "remold", version, about, long_about = None)]
pub struct Cli {
    /// Path to the transformation configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Path to the source document to transform (JSON)
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,

    /// Log level filter (also via RUST_LOG)
    #[arg(long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,
}
