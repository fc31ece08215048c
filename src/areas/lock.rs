use crate::errors::{IoContext, Result};
use file_guard::{FileGuard, Lock};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// Exclusive advisory lock on `<meta>/lock`, held by mutating operations
///
/// Released when dropped.
pub struct RepositoryLock {
    _guard: FileGuard<Box<File>>,
}

impl RepositoryLock {
    /// Block until the lock is acquired
    pub fn acquire(path: &Path) -> Result<Self> {
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .io_path_context("unable to open lock file", path)?;

        let guard = file_guard::lock(Box::new(file), Lock::Exclusive, 0, 1)
            .io_path_context("unable to lock", path)?;
        debug!(path = %path.display(), "acquired repository lock");

        Ok(RepositoryLock { _guard: guard })
    }
}

impl std::fmt::Debug for RepositoryLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryLock").finish_non_exhaustive()
    }
}
