//! Path utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `relative_url`)

pub mod fs;

pub use fs::{normalize_path, relative_url};
