//! Asset copying with side effects.

use std::fs::{self, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failure to import a single image.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot create `{}`: {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot copy `{}` -> `{}`: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Create `dir` (and missing parents) if it does not exist yet.
pub fn ensure_dir(dir: &Path) -> Result<(), ImportError> {
    fs::create_dir_all(dir).map_err(|source| ImportError::CreateDir {
        dir: dir.to_path_buf(),
        source,
    })
}

/// Copy `from` to `to`, carrying over access and modification times.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), ImportError> {
    copy_with_times(from, to).map_err(|source| ImportError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

fn copy_with_times(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;

    let meta = fs::metadata(from)?;
    let mut times = FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }

    OpenOptions::new().write(true).open(to)?.set_times(times)
}
