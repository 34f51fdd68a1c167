//! Path normalization utilities.
//!
//! Provides consistent path handling across the codebase:
//! - `normalize_path` - file system paths (canonicalize + lexical fallback)
//! - `relative_url` - forward-slash relative path between two absolute paths

use std::path::{Component, Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Lexical cleanup if already absolute
/// - Join with current directory, then lexical cleanup, if relative
///
/// # Example
/// ```ignore
/// let abs = normalize_path(Path::new("./docs/../readme.md"));
/// ```
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            lexical_normalize(path)
        } else {
            std::env::current_dir().map_or_else(
                |_| path.to_path_buf(),
                |cwd| lexical_normalize(&cwd.join(path)),
            )
        }
    })
}

/// Remove `.` and resolve `..` components without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` on a root is a no-op, matching `/..` == `/`
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Relative path from `base` (a directory) to `target`, joined with `/`.
///
/// Both paths are expected to be absolute. When they share no root
/// (e.g. different drive letters), the target is returned with its
/// separators converted to `/`.
///
/// # Example
/// ```ignore
/// relative_url(Path::new("/docs/.assets/logo.png"), Path::new("/docs"))
///     == ".assets/logo.png"
/// ```
pub fn relative_url(target: &Path, base: &Path) -> String {
    let target_parts: Vec<_> = target.components().collect();
    let base_parts: Vec<_> = base.components().collect();

    let common = target_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    if common == 0 {
        return to_forward_slashes(target);
    }

    let ups = base_parts.len() - common;
    let mut segments: Vec<String> = std::iter::repeat_n("..".to_string(), ups).collect();
    segments.extend(
        target_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_absolute() {
        let path = Path::new("/absolute/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_relative() {
        let path = Path::new("relative/path/file.txt");
        let normalized = normalize_path(path);
        assert!(normalized.is_absolute());
    }

    #[test]
    fn test_normalize_path_resolves_parent_dirs_lexically() {
        let normalized = normalize_path(Path::new("/nonexistent/a/../b/./c.png"));
        assert_eq!(normalized, PathBuf::from("/nonexistent/b/c.png"));
    }

    #[test]
    fn test_relative_url_child() {
        assert_eq!(
            relative_url(Path::new("/docs/.assets/logo.png"), Path::new("/docs")),
            ".assets/logo.png"
        );
    }

    #[test]
    fn test_relative_url_sibling_and_parent() {
        assert_eq!(
            relative_url(Path::new("/shared/pic.jpg"), Path::new("/docs/guide")),
            "../../shared/pic.jpg"
        );
        assert_eq!(
            relative_url(Path::new("/docs"), Path::new("/docs")),
            "."
        );
    }
}
