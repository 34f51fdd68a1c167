//! Reference rewriting for a single document.
//!
//! Every image reference that resolves to an existing local file is copied
//! into the document's assets directory and its URL replaced by a relative
//! path to the copy. Markdown references are handled first, then HTML.
//!
//! Each reference yields a [`RefOutcome`]. A failed copy only affects its
//! own reference; the text around it is left as written.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::asset::{self, Destination, ImportError, Reservations, choose_destination};
use crate::core::{LinkTarget, points_into_assets};
use crate::utils::path::relative_url;

use super::scan::{ImageRef, RefKind, replace_refs};

/// One imported image: where it came from and where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRecord {
    pub source: PathBuf,
    pub dest: PathBuf,
    /// False when identical content was already at `dest`
    pub copied: bool,
}

/// Why a reference was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Remote scheme, empty or malformed URL
    NotLocal,
    /// Resolved path does not exist
    Missing,
    /// Already points into an assets directory
    AlreadyImported,
}

/// Result of processing one reference.
#[derive(Debug)]
pub enum RefOutcome {
    Imported(CopyRecord),
    Skipped { url: String, reason: SkipReason },
    Failed { source: PathBuf, error: ImportError },
}

/// Rewritten text plus what happened to each reference, in processing order.
#[derive(Debug)]
pub struct Rewrite<'t> {
    pub text: Cow<'t, str>,
    pub outcomes: Vec<RefOutcome>,
}

impl Rewrite<'_> {
    /// Whether any reference was rewritten.
    pub fn changed(&self) -> bool {
        self.copies().next().is_some()
    }

    /// Imported images (performed or planned).
    pub fn copies(&self) -> impl Iterator<Item = &CopyRecord> {
        self.outcomes.iter().filter_map(|o| match o {
            RefOutcome::Imported(record) => Some(record),
            _ => None,
        })
    }

    /// References pointing at local files that do not exist.
    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o {
            RefOutcome::Skipped {
                url,
                reason: SkipReason::Missing,
            } => Some(url.as_str()),
            _ => None,
        })
    }

    /// References whose import failed.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &ImportError)> {
        self.outcomes.iter().filter_map(|o| match o {
            RefOutcome::Failed { source, error } => Some((source.as_path(), error)),
            _ => None,
        })
    }
}

/// Rewrites references for documents living in one directory.
#[derive(Debug, Clone, Copy)]
pub struct Rewriter<'a> {
    /// Document's parent directory
    base_dir: &'a Path,
    /// Assets directory name (a single path segment)
    assets_name: &'a str,
    /// Plan only: no directory creation, no copies
    dry_run: bool,
}

impl<'a> Rewriter<'a> {
    pub fn new(base_dir: &'a Path, assets_name: &'a str, dry_run: bool) -> Self {
        Self {
            base_dir,
            assets_name,
            dry_run,
        }
    }

    /// The document's own assets directory.
    pub fn assets_dir(&self) -> PathBuf {
        self.base_dir.join(self.assets_name)
    }

    /// Rewrite every local image reference in `text`.
    pub fn rewrite<'t>(&self, text: &'t str) -> Rewrite<'t> {
        let mut outcomes = Vec::new();
        let mut reservations = Reservations::new();

        let mut pass = |text: Cow<'t, str>, kind: RefKind| -> Cow<'t, str> {
            let replaced = replace_refs(&text, kind, |image| {
                let (outcome, replacement) = self.import(image, &mut reservations);
                outcomes.push(outcome);
                replacement
            })
            .into_owned();
            // Keep borrowing the input when nothing changed
            if replaced == *text { text } else { Cow::Owned(replaced) }
        };

        let text = pass(Cow::Borrowed(text), RefKind::Markdown);
        let text = pass(text, RefKind::Html);

        Rewrite { text, outcomes }
    }

    /// Import a single reference, returning its outcome and replacement text.
    fn import(
        &self,
        image: &ImageRef<'_>,
        reservations: &mut Reservations,
    ) -> (RefOutcome, Option<String>) {
        let skip = |reason: SkipReason| -> (RefOutcome, Option<String>) {
            let url = image.url.to_string();
            (RefOutcome::Skipped { url, reason }, None)
        };

        let source = match LinkTarget::classify(image.url, self.base_dir) {
            LinkTarget::Local(path) => path,
            LinkTarget::NotLocal => return skip(SkipReason::NotLocal),
        };
        if !source.is_file() {
            return skip(SkipReason::Missing);
        }
        if points_into_assets(image.url, self.assets_name, self.base_dir) {
            return skip(SkipReason::AlreadyImported);
        }

        let dest = match self.place(&source, reservations) {
            Ok(Some(dest)) => dest,
            Ok(None) => return skip(SkipReason::Missing),
            Err(error) => return (RefOutcome::Failed { source, error }, None),
        };

        let new_url = relative_url(dest.path(), self.base_dir);
        let record = CopyRecord {
            source,
            dest: dest.path().to_path_buf(),
            copied: dest.needs_copy(),
        };
        (RefOutcome::Imported(record), Some(image.with_url(&new_url)))
    }

    /// Select a destination for `source` and copy it there (unless dry run).
    fn place(
        &self,
        source: &Path,
        reservations: &mut Reservations,
    ) -> Result<Option<Destination>, ImportError> {
        let assets_dir = self.assets_dir();
        if !self.dry_run {
            asset::ensure_dir(&assets_dir)?;
        }

        let Some(dest) = choose_destination(&assets_dir, source, reservations) else {
            return Ok(None);
        };
        if !self.dry_run && dest.needs_copy() {
            asset::copy_file(source, dest.path())?;
        }

        reservations.reserve(dest.path(), source);
        Ok(Some(dest))
    }
}
