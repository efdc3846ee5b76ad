//! paramconf
//!
//! Loads a configuration file, follows its imports, substitutes its
//! parameters and prints the resolved tree.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use paramconf::cli::Cli;
use paramconf::config::ConfigLoader;
use paramconf::format::OutputFormat;
use paramconf::logging::{LogTarget, init_logging};
use serde_json::Value;
use std::io::Write;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let format = OutputFormat::from_str(&cli.format)
        .ok_or_else(|| anyhow!("Unknown output format: {}", cli.format))?;

    let mut loader = match &cli.cache {
        Some(cache_path) => ConfigLoader::with_cache(cache_path, cli.debug),
        None => ConfigLoader::new(),
    };
    loader.set_options(cli.options());

    let configuration = loader
        .load(&cli.file)
        .with_context(|| format!("Failed to load {}", cli.file.display()))?;
    debug!(
        resources = loader.resources().len(),
        parameters = loader.parameters().len(),
        "Configuration loaded"
    );

    let output = if cli.show_parameters {
        Value::Object(loader.parameters().all().clone())
    } else {
        configuration
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(format.render(&output)?.as_bytes())?;
    Ok(())
}
