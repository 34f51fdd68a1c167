//! Image link classification.
//!
//! Decides whether a reference written in a document points at the local
//! filesystem, and if so, where.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::utils::path::normalize_path;

/// Schemes that are never imported (matched case-insensitively).
const SKIP_SCHEMES: &[&str] = &["http://", "https://", "data:", "mailto:"];

const FILE_SCHEME: &str = "file://";

/// Classification of a reference URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Remote scheme, empty, or malformed. Left untouched.
    NotLocal,
    /// Local filesystem path. Existence is not checked.
    Local(PathBuf),
}

impl LinkTarget {
    /// Classify `url` as written in a document living in `base_dir`.
    pub fn classify(url: &str, base_dir: &Path) -> Self {
        let url = url.trim();
        if url.is_empty() || has_skip_scheme(url) {
            return Self::NotLocal;
        }

        if starts_with_ignore_case(url, FILE_SCHEME) {
            return match file_url_path(url) {
                Some(path) => Self::Local(path),
                None => Self::NotLocal,
            };
        }

        let decoded = percent_decode(url);
        if is_windows_absolute(&decoded) || decoded.starts_with(['/', '~']) {
            let expanded = shellexpand::tilde(&*decoded);
            return Self::Local(PathBuf::from(expanded.into_owned()));
        }

        Self::Local(normalize_path(&base_dir.join(&*decoded)))
    }
}

/// Whether `url` already points inside an assets directory named
/// `assets_name`, and that file exists relative to `base_dir`.
///
/// Compares path segments of the decoded URL, so any segment with the same
/// name counts, even one that is not the document's own assets directory.
pub fn points_into_assets(url: &str, assets_name: &str, base_dir: &Path) -> bool {
    let decoded = percent_decode(url.trim());
    let relative = Path::new(&*decoded);

    let has_segment = relative
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == assets_name));

    has_segment && base_dir.join(relative).exists()
}

// =============================================================================
// Helpers (pure functions)
// =============================================================================

fn has_skip_scheme(url: &str) -> bool {
    SKIP_SCHEMES
        .iter()
        .any(|scheme| starts_with_ignore_case(url, scheme))
}

#[inline]
fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn percent_decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

/// Path component of a `file://` URL, decoded.
///
/// `file:///C:/x.png` yields `C:/x.png` rather than `/C:/x.png`.
fn file_url_path(url: &str) -> Option<PathBuf> {
    let parsed = url::Url::parse(url).ok()?;
    let path = percent_decode(parsed.path()).into_owned();

    let bytes = path.as_bytes();
    let drive_letter = bytes.len() >= 4
        && bytes[0] == b'/'
        && bytes[1].is_ascii_alphabetic()
        && bytes[2] == b':'
        && bytes[3] == b'/';

    if drive_letter {
        Some(PathBuf::from(&path[1..]))
    } else {
        Some(PathBuf::from(path))
    }
}

/// `C:\x`, `c:/x` or `\\server\share`.
fn is_windows_absolute(s: &str) -> bool {
    let bytes = s.as_bytes();
    let drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && matches!(bytes[2], b'/' | b'\\');
    drive || s.starts_with("\\\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_classify_skip_schemes() {
        let base = Path::new("/docs");
        for url in [
            "http://example.com/x.png",
            "https://example.com/x.png",
            "HTTPS://EXAMPLE.COM/X.PNG",
            "data:image/png;base64,iVBORw0KGgo=",
            "mailto:someone@example.com",
            "",
            "   ",
        ] {
            assert_eq!(LinkTarget::classify(url, base), LinkTarget::NotLocal, "{url}");
        }
    }

    #[test]
    fn test_classify_relative() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().canonicalize().unwrap();
        fs::create_dir_all(base.join("images")).unwrap();
        fs::write(base.join("images/logo.png"), b"png").unwrap();

        let target = LinkTarget::classify("images/logo.png", &base);
        assert_eq!(target, LinkTarget::Local(base.join("images/logo.png")));

        let target = LinkTarget::classify("./images/../images/logo.png", &base);
        assert_eq!(target, LinkTarget::Local(base.join("images/logo.png")));
    }

    #[test]
    fn test_classify_relative_percent_decoded() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().canonicalize().unwrap();
        fs::write(base.join("my pic.png"), b"png").unwrap();

        let target = LinkTarget::classify("my%20pic.png", &base);
        assert_eq!(target, LinkTarget::Local(base.join("my pic.png")));
    }

    #[test]
    fn test_classify_missing_file_is_still_local() {
        let target = LinkTarget::classify("nope/missing.png", Path::new("/nonexistent"));
        assert_eq!(
            target,
            LinkTarget::Local(PathBuf::from("/nonexistent/nope/missing.png"))
        );
    }

    #[test]
    fn test_classify_posix_absolute() {
        let target = LinkTarget::classify("/var/img/a.png", Path::new("/docs"));
        assert_eq!(target, LinkTarget::Local(PathBuf::from("/var/img/a.png")));
    }

    #[test]
    fn test_classify_tilde() {
        let LinkTarget::Local(path) = LinkTarget::classify("~/pics/a.png", Path::new("/docs"))
        else {
            panic!("tilde path should be local");
        };
        assert!(!path.starts_with("~"));
        assert!(path.ends_with("pics/a.png"));
    }

    #[test]
    fn test_classify_windows_absolute_is_not_joined() {
        let target = LinkTarget::classify("C:\\img\\a.png", Path::new("/docs"));
        assert_eq!(target, LinkTarget::Local(PathBuf::from("C:\\img\\a.png")));

        let target = LinkTarget::classify("\\\\server\\share\\a.png", Path::new("/docs"));
        assert_eq!(
            target,
            LinkTarget::Local(PathBuf::from("\\\\server\\share\\a.png"))
        );
    }

    #[test]
    fn test_classify_file_url() {
        let target = LinkTarget::classify("file:///tmp/my%20img.png", Path::new("/docs"));
        assert_eq!(target, LinkTarget::Local(PathBuf::from("/tmp/my img.png")));

        let target = LinkTarget::classify("FILE:///C:/img/a.png", Path::new("/docs"));
        assert_eq!(target, LinkTarget::Local(PathBuf::from("C:/img/a.png")));
    }

    #[test]
    fn test_points_into_assets() {
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join(".assets")).unwrap();
        fs::write(base.join(".assets/logo.png"), b"png").unwrap();

        assert!(points_into_assets(".assets/logo.png", ".assets", base));
        assert!(!points_into_assets(".assets/missing.png", ".assets", base));
        assert!(!points_into_assets("images/logo.png", ".assets", base));
        // Segment match only, not substring
        assert!(!points_into_assets("my.assets/logo.png", ".assets", base));
    }

    #[test]
    fn test_points_into_assets_matches_any_segment() {
        // Known approximation: a nested folder sharing the assets name counts too
        let dir = TempDir::new().unwrap();
        let base = dir.path();
        fs::create_dir_all(base.join("vendor/.assets")).unwrap();
        fs::write(base.join("vendor/.assets/icon.png"), b"png").unwrap();

        assert!(points_into_assets("vendor/.assets/icon.png", ".assets", base));
    }
}
