//! Destination selection inside an assets directory.
//!
//! Picks a file name for an imported image so that no file with different
//! content is ever overwritten. Selection only, the filesystem is not touched.
//!
//! ```text
//! .assets/
//! ├── logo.png      ← same bytes as source: reused
//! ├── logo-1.png    ← different bytes: skipped
//! └── logo-2.png    ← free: chosen
//! ```

use rustc_hash::FxHashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::digest::same_content;

/// Where an imported image should land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Nothing occupies this path yet: copy the source here.
    Fresh(PathBuf),
    /// A file with identical content already occupies this path.
    Reuse(PathBuf),
}

impl Destination {
    #[inline]
    pub fn path(&self) -> &Path {
        match self {
            Self::Fresh(path) | Self::Reuse(path) => path,
        }
    }

    #[inline]
    pub fn needs_copy(&self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// Destinations claimed earlier in the same document but possibly not yet on
/// disk (dry run). Maps destination to the source whose bytes it will hold.
#[derive(Debug, Default)]
pub struct Reservations {
    claimed: FxHashMap<PathBuf, PathBuf>,
}

impl Reservations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dest` will hold the content of `source`.
    pub fn reserve(&mut self, dest: &Path, source: &Path) {
        self.claimed
            .entry(dest.to_path_buf())
            .or_insert_with(|| source.to_path_buf());
    }

    /// File whose content represents what sits (or will sit) at `dest`.
    fn occupant(&self, dest: &Path) -> Option<PathBuf> {
        if let Some(source) = self.claimed.get(dest) {
            return Some(source.clone());
        }
        dest.exists().then(|| dest.to_path_buf())
    }
}

/// Choose the destination for `source` inside `dest_dir`.
///
/// Tries `<dir>/<name>`, then `<stem>-1<.ext>`, `<stem>-2<.ext>`, ... and
/// stops at the first candidate that is free or already holds identical
/// content. Returns `None` when `source` has no file name.
pub fn choose_destination(
    dest_dir: &Path,
    source: &Path,
    reservations: &Reservations,
) -> Option<Destination> {
    let name = source.file_name()?;
    let primary = dest_dir.join(name);

    let mut candidate = primary.clone();
    let mut counter = 0usize;
    loop {
        match reservations.occupant(&candidate) {
            None => return Some(Destination::Fresh(candidate)),
            Some(existing) if same_content(&existing, source) => {
                return Some(Destination::Reuse(candidate));
            }
            Some(_) => {
                counter += 1;
                candidate = dest_dir.join(suffixed_name(&primary, counter));
            }
        }
    }
}

/// `name.ext` → `name-<n>.ext`; `name` → `name-<n>`.
fn suffixed_name(path: &Path, n: usize) -> OsString {
    let mut name = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push(format!("-{n}"));
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    name
}
