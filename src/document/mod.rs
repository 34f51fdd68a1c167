//! Per-document processing: read, rewrite, then report or write back.
//!
//! ```text
//! Read ─→ Rewrite ─┬─→ Dry-report   (--dry-run)
//!                  ├─→ Write        (references rewritten)
//!                  └─→ Skip         (nothing to import)
//! ```

mod rewrite;
mod scan;

use rewrite::Rewriter;

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ImportConfig;
use crate::utils::plural::plural_count;
use crate::{debug, log};

/// What happened to one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentReport {
    /// Document was rewritten on disk (always false in dry run)
    pub changed: bool,
    /// Images imported, or planned in dry run
    pub copies: usize,
    /// References whose import failed
    pub failures: usize,
}

/// Process one document at `path` (absolute).
pub fn process_document(path: &Path, config: &ImportConfig) -> Result<DocumentReport> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read `{}`", path.display()))?;
    // Undecodable bytes are replaced rather than rejected
    let text = String::from_utf8_lossy(&bytes);

    let base_dir = parent_dir(path);
    let rewriter = Rewriter::new(&base_dir, config.assets_name(), config.dry_run);
    let result = rewriter.rewrite(&text);

    for url in result.missing() {
        debug!("warn"; "{}: image not found: {}", path.display(), url);
    }
    for (source, error) in result.failures() {
        debug!("warn"; "copy failed: {} -> {} ({})",
            source.display(), rewriter.assets_dir().display(), error);
    }

    let copies = result.copies().count();
    let failures = result.failures().count();

    if config.dry_run {
        if copies > 0 {
            log!("dry"; "{}: would copy {}", path.display(), plural_count(copies, "file"));
            for record in result.copies() {
                let note = if record.copied { "" } else { " (already present)" };
                log!("dry"; "  {} -> {}{}", record.source.display(), record.dest.display(), note);
            }
        }
        return Ok(DocumentReport {
            changed: false,
            copies,
            failures,
        });
    }

    if !result.changed() {
        debug!("skip"; "{}: no local images to import", path.display());
        return Ok(DocumentReport {
            changed: false,
            copies: 0,
            failures,
        });
    }

    fs::write(path, result.text.as_bytes())
        .with_context(|| format!("Failed to write `{}`", path.display()))?;
    debug!("ok"; "{}: copied {} and rewrote links", path.display(), plural_count(copies, "file"));

    Ok(DocumentReport {
        changed: true,
        copies,
        failures,
    })
}

/// Directory the document lives in; relative links resolve against it.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
