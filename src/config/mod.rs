//! Import configuration: optional `mdassets.toml` merged with CLI flags.
//!
//! # Example
//!
//! ```toml
//! [import]
//! assets = ".assets"          # Per-document assets directory name
//! extensions = ["md"]         # Document extensions (case-insensitive)
//! exclude = ["node_modules"]  # Directory names skipped by --all
//! ```
//!
//! Precedence: CLI flag > config file > built-in default.

mod error;
mod util;

pub use error::ConfigError;
use util::find_config_file;

use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default assets directory name.
pub const DEFAULT_ASSETS: &str = ".assets";

// ============================================================================
// file configuration
// ============================================================================

/// Root structure of `mdassets.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub import: ImportSection,
}

/// `[import]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    /// Assets directory name, created next to each document.
    pub assets: String,

    /// Document extensions, without the dot.
    pub extensions: Vec<String>,

    /// Directory names skipped during recursive discovery.
    pub exclude: Vec<String>,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            assets: DEFAULT_ASSETS.to_string(),
            extensions: vec!["md".to_string()],
            exclude: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Load from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring:", path.display());
            for field in &ignored {
                log!("warning"; "- {}", field);
            }
        }
        Ok(config)
    }
}

// ============================================================================
// runtime configuration
// ============================================================================

/// Which documents to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    /// Recursive discovery under the working directory
    All,
    /// Paths as given on the command line (unfiltered)
    Files(Vec<PathBuf>),
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,
    pub import: ImportSection,
    pub targets: Targets,
    pub dry_run: bool,
    pub verbose: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            import: ImportSection::default(),
            targets: Targets::Files(Vec::new()),
            dry_run: false,
            verbose: false,
        }
    }
}

impl ImportConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file; a missing file is fine.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let config_path = find_config_file(&cli.config, &cwd);

        let file = match &config_path {
            Some(path) => ConfigFile::from_path(path)
                .with_context(|| format!("Failed to load `{}`", path.display()))?,
            None => ConfigFile::default(),
        };

        let mut config = Self {
            config_path,
            import: file.import,
            ..Self::default()
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string (no CLI overrides).
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(content).map_err(ConfigError::from)?;
        let config = Self {
            import: file.import,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line options on top of file settings.
    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(assets) = &cli.assets {
            self.import.assets = assets.clone();
        }
        self.targets = if cli.all {
            Targets::All
        } else {
            Targets::Files(cli.files.clone())
        };
        self.dry_run = cli.dry_run;
        self.verbose = cli.verbose;
    }

    /// Reject settings that would make imports land outside the document's directory.
    fn validate(&self) -> Result<(), ConfigError> {
        let assets = self.import.assets.as_str();
        if assets.is_empty() {
            return Err(ConfigError::Validation(
                "`import.assets` must not be empty".into(),
            ));
        }
        if assets == "." || assets == ".." || assets.contains(['/', '\\']) {
            return Err(ConfigError::Validation(format!(
                "`import.assets` must be a single directory name, got `{assets}`"
            )));
        }
        if self.import.extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "`import.extensions` must list at least one extension".into(),
            ));
        }
        Ok(())
    }

    /// Assets directory name.
    #[inline]
    pub fn assets_name(&self) -> &str {
        &self.import.assets
    }

    /// Whether `path` names a document (case-insensitive extension match).
    pub fn is_document(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_ascii_lowercase();
        self.import.extensions.iter().any(|ext| {
            let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
            !ext.is_empty() && name.ends_with(&format!(".{ext}"))
        })
    }

    /// Whether recursive discovery should skip a directory with this name.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        name == self.import.assets || self.import.exclude.iter().any(|e| e == name)
    }
}

// ============================================================================
// tests
// ============================================================================
