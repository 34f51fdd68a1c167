//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Copy local images referenced by markdown documents into a per-document
/// assets directory and rewrite the links.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Markdown files to process (files without a markdown extension are ignored)
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Recursively process all markdown files under the current directory
    #[arg(long)]
    pub all: bool,

    /// Assets directory name [default: .assets]
    #[arg(long, value_name = "NAME")]
    pub assets: Option<String>,

    /// Show what would change without writing files or copying images
    #[arg(long)]
    pub dry_run: bool,

    /// Print per-document status and copy warnings
    #[arg(short, long)]
    pub verbose: bool,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, default_value = "mdassets.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["mdassets"]);
        assert!(cli.files.is_empty());
        assert!(!cli.all);
        assert_eq!(cli.assets, None);
        assert!(!cli.dry_run);
        assert!(!cli.verbose);
        assert_eq!(cli.config, PathBuf::from("mdassets.toml"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "mdassets", "--all", "--assets", "img", "--dry-run", "--verbose", "--color", "never",
        ]);
        assert!(cli.all);
        assert_eq!(cli.assets.as_deref(), Some("img"));
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }
}
