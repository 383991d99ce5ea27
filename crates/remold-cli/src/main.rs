//! remold command-line interface
//!
//! Reads a transformation configuration and a source document, runs the
//! transformation, and prints the result to stdout.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use remold_core::{TransformConfig, TransformEngine};
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    let config_text = fs::read_to_string(&cli.config)
        .with_context(|| format!("failed to read config file: {}", cli.config.display()))?;
    let config: TransformConfig = serde_json::from_str(&config_text)
        .with_context(|| format!("failed to parse config file: {}", cli.config.display()))?;

    let engine = TransformEngine::new(config).context("invalid transformation configuration")?;
    tracing::debug!(config = %cli.config.display(), "engine constructed");

    let source = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read input file: {}", cli.input.display()))?;
    let output = engine
        .transform(&source)
        .context("transformation failed")?;

    let rendered = if cli.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{}", rendered);

    Ok(())
}
