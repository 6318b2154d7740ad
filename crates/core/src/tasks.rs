//! Task directory layout.
//!
//! Each pipeline task gets its own directory under
//! `<storage_root>/tasks/<task_id>` where providers drop downloaded or
//! generated artifacts. Creation is idempotent so concurrent providers
//! working on the same task do not race each other.

use std::io;
use std::path::{Path, PathBuf};

/// Environment variable overriding the storage root.
pub const STORAGE_DIR_ENV: &str = "CLIPFORGE_STORAGE_DIR";

/// Default storage root, relative to the working directory.
pub const DEFAULT_STORAGE_DIR: &str = "storage";

/// Resolve the storage root from the environment, falling back to
/// [`DEFAULT_STORAGE_DIR`].
pub fn storage_root() -> PathBuf {
    std::env::var(STORAGE_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_DIR))
}

/// Resolve (and create, if absent) the directory for a task under the
/// configured storage root.
pub fn task_dir(task_id: &str) -> io::Result<PathBuf> {
    task_dir_in(&storage_root(), task_id)
}

/// Resolve (and create, if absent) the directory for a task under an
/// explicit storage root.
pub fn task_dir_in(root: &Path, task_id: &str) -> io::Result<PathBuf> {
    let dir = root.join("tasks").join(task_id);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
