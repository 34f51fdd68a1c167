//! Batch driver: resolve target documents and process them one by one.

use anyhow::{Context, Result};
use jwalk::{Parallelism, WalkDir};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ImportConfig, Targets};
use crate::document::{DocumentReport, process_document};
use crate::utils::path::normalize_path;
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// Aggregate over all processed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub documents: usize,
    pub changed: usize,
    pub copies: usize,
    pub failures: usize,
    pub errors: usize,
}

impl Summary {
    fn add(&mut self, report: &DocumentReport) {
        self.documents += 1;
        self.changed += usize::from(report.changed);
        self.copies += report.copies;
        self.failures += report.failures;
    }

    /// Whether any document was rewritten.
    pub fn any_changed(&self) -> bool {
        self.changed > 0
    }
}

/// Run the import over every target document.
pub fn run_import(config: &ImportConfig) -> Result<Summary> {
    let targets = resolve_targets(config)?;
    if targets.is_empty() {
        log!("import"; "No markdown files. Use --all or pass .md paths explicitly.");
        return Ok(Summary::default());
    }

    let mut summary = Summary::default();
    for path in &targets {
        match process_document(path, config) {
            Ok(report) => summary.add(&report),
            Err(e) => {
                summary.errors += 1;
                log!("error"; "{:#}", e);
            }
        }
    }

    print_summary(&summary, config);
    Ok(summary)
}

fn print_summary(summary: &Summary, config: &ImportConfig) {
    if config.dry_run {
        log!("dry"; "Dry-run finished. No files were changed.");
    } else if summary.any_changed() {
        log!("import"; "Done. {} of {} rewritten, {} imported.",
            summary.changed,
            plural_count(summary.documents, "document"),
            plural_count(summary.copies, "image"));
    } else {
        log!("import"; "No changes.");
    }

    if summary.errors > 0 {
        log!("warning"; "{} could not be processed", plural_count(summary.errors, "document"));
    }
    if summary.failures > 0 {
        log!("warning"; "{} could not be copied{}",
            plural_count(summary.failures, "image"),
            if config.verbose { "" } else { " (use --verbose for details)" });
    }
}

// =============================================================================
// Target resolution
// =============================================================================

/// Absolute paths of the documents to process, in processing order.
pub fn resolve_targets(config: &ImportConfig) -> Result<Vec<PathBuf>> {
    match &config.targets {
        Targets::All => {
            let cwd =
                std::env::current_dir().context("Failed to get current working directory")?;
            discover(&cwd, config)
        }
        Targets::Files(files) => Ok(filter_files(files, config)),
    }
}

/// Keep paths with a document extension, resolved to absolute form.
fn filter_files(files: &[PathBuf], config: &ImportConfig) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|path| config.is_document(path))
        .map(|path| normalize_path(path))
        .collect()
}

/// Recursively collect documents under `root`.
///
/// Skips excluded directories and assets directories. Order follows the
/// directory walk and is not sorted.
fn discover(root: &Path, config: &ImportConfig) -> Result<Vec<PathBuf>> {
    // An unreadable root is fatal; unreadable subdirectories are not
    fs::read_dir(root).with_context(|| format!("Failed to read `{}`", root.display()))?;

    let filter = config.clone();

    let walker = WalkDir::new(root)
        .skip_hidden(false)
        .parallelism(Parallelism::Serial)
        .process_read_dir(move |_depth, _path, _state, children| {
            children.retain(|entry| match entry {
                Ok(e) if e.file_type().is_dir() => {
                    !filter.is_excluded_dir(&e.file_name().to_string_lossy())
                }
                _ => true,
            });
        });

    let mut documents = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("warn"; "skipping unreadable entry: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if config.is_document(&path) && path.is_file() {
            documents.push(normalize_path(&path));
        }
    }
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sorted(mut paths: Vec<PathBuf>) -> Vec<PathBuf> {
        paths.sort();
        paths
    }

    #[test]
    fn test_filter_files_by_extension() {
        let config = ImportConfig::default();
        let files = [
            PathBuf::from("/docs/a.md"),
            PathBuf::from("/docs/b.txt"),
            PathBuf::from("/docs/C.MD"),
        ];
        let targets = filter_files(&files, &config);
        assert_eq!(
            targets,
            [PathBuf::from("/docs/a.md"), PathBuf::from("/docs/C.MD")]
        );
    }

    #[test]
    fn test_filter_files_resolves_relative() {
        let config = ImportConfig::default();
        let targets = filter_files(&[PathBuf::from("notes/x.md")], &config);
        assert!(targets[0].is_absolute());
        assert!(targets[0].ends_with("notes/x.md"));
    }

    #[test]
    fn test_filter_files_keeps_duplicates_in_order() {
        let config = ImportConfig::default();
        let files = [PathBuf::from("/d/b.md"), PathBuf::from("/d/a.md"), PathBuf::from("/d/b.md")];
        assert_eq!(filter_files(&files, &config), files);
    }

    #[test]
    fn test_discover_recursive() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("guide/deep")).unwrap();
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::create_dir_all(root.join(".assets")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("README.md"), "").unwrap();
        fs::write(root.join("guide/intro.md"), "").unwrap();
        fs::write(root.join("guide/deep/UPPER.MD"), "").unwrap();
        fs::write(root.join("guide/notes.txt"), "").unwrap();
        fs::write(root.join(".hidden/secret.md"), "").unwrap();
        fs::write(root.join(".assets/stray.md"), "").unwrap();
        fs::write(root.join("node_modules/pkg/readme.md"), "").unwrap();

        let config = ImportConfig::from_str("[import]\nexclude = [\"node_modules\"]").unwrap();
        let found = sorted(discover(&root, &config).unwrap());
        assert_eq!(
            found,
            sorted(vec![
                root.join("README.md"),
                root.join("guide/intro.md"),
                root.join("guide/deep/UPPER.MD"),
                root.join(".hidden/secret.md"),
            ])
        );
    }

    #[test]
    fn test_discover_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        assert!(discover(&missing, &ImportConfig::default()).is_err());
    }

    #[test]
    fn test_run_import_explicit_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::create_dir_all(root.join("a/img")).unwrap();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::write(root.join("a/img/x.png"), b"x").unwrap();
        fs::write(root.join("a/doc.md"), "![x](img/x.png)").unwrap();
        fs::write(root.join("b/doc.md"), "plain").unwrap();

        let config = ImportConfig {
            targets: Targets::Files(vec![
                root.join("a/doc.md"),
                root.join("b/doc.md"),
                root.join("b/missing.md"),
            ]),
            ..ImportConfig::default()
        };
        let summary = run_import(&config).unwrap();
        assert_eq!(
            summary,
            Summary {
                documents: 2,
                changed: 1,
                copies: 1,
                failures: 0,
                errors: 1,
            }
        );
        assert_eq!(fs::read_to_string(root.join("a/doc.md")).unwrap(), "![x](.assets/x.png)");
        // Assets stay scoped to each document's own directory
        assert!(root.join("a/.assets/x.png").exists());
        assert!(!root.join("b/.assets").exists());
    }

    #[test]
    fn test_run_import_no_targets() {
        let config = ImportConfig {
            targets: Targets::Files(vec![PathBuf::from("notes.txt")]),
            ..ImportConfig::default()
        };
        assert_eq!(run_import(&config).unwrap(), Summary::default());
    }
}
