//! mdassets - collect local images referenced by markdown documents.
//!
//! Each document's images are copied into an assets directory next to it
//! (default `.assets`) and the references are rewritten to point there.

mod asset;
mod cli;
mod config;
mod core;
mod document;
mod logger;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, import::run_import};
use config::ImportConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = ImportConfig::load(&cli)?;
    logger::set_verbose(config.verbose);

    if let Some(path) = &config.config_path {
        debug!("config"; "using {}", path.display());
    }

    run_import(&config).map(|_| ())
}
