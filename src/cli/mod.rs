//! CLI definition for paramconf.
//!
//! This module defines the CLI structure using clap's derive macros.

use crate::config::Options;
use clap::Parser;
use std::path::PathBuf;

/// Resolve a configuration file (imports and %parameters%) and print the result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to load (.json, .yaml, .yml or .toml)
    pub file: PathBuf,

    /// Cache the resolved configuration at this path
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Check source files for changes before trusting the cache
    #[arg(long)]
    pub debug: bool,

    /// Output format: json or yaml
    #[arg(short, long, default_value = "json")]
    pub format: String,

    /// Ignore the imports directive
    #[arg(long)]
    pub no_imports: bool,

    /// Leave placeholders unresolved
    #[arg(long)]
    pub no_parameters: bool,

    /// Key of the imports directive
    #[arg(long, default_value = "imports")]
    pub imports_key: String,

    /// Key of the parameters block
    #[arg(long, default_value = "parameters")]
    pub parameters_key: String,

    /// Print the resolved parameters instead of the configuration
    /// (empty when the configuration is served from the cache)
    #[arg(long)]
    pub show_parameters: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,
}

impl Cli {
    /// Loader options selected on the command line.
    pub fn options(&self) -> Options {
        let mut options = Options::default();
        options
            .set_enable_imports(!self.no_imports)
            .set_enable_parameters(!self.no_parameters)
            .set_imports_key(self.imports_key.clone())
            .set_parameters_key(self.parameters_key.clone());
        options
    }
}
