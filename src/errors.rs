//! Library error type
//!
//! Every fallible operation in the library returns [`Result`]. The variants map
//! one-to-one onto the failure kinds callers are expected to react to; the
//! binary wraps them into `anyhow` for reporting.

use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// An object, commit, ref or working-tree path is missing
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// The operation is not allowed in the current state (e.g. unstaging a path that is not staged)
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("nothing to commit: no staged files")]
    EmptyCommit,

    /// A patch hunk no longer matches its target
    #[error("hunk {index} does not apply: {reason}")]
    HunkOutOfRange { index: usize, reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The metadata directory is missing or malformed
    #[error("not a valid repository: {0}")]
    InvalidRepository(String),

    /// A stored object or a patch could not be parsed
    #[error("invalid object: {0}")]
    InvalidObject(String),

    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("ambiguous revision {prefix}: candidates {candidates:?}")]
    AmbiguousRevision {
        prefix: String,
        candidates: Vec<String>,
    },

    /// Checkout or pull would overwrite uncommitted changes
    #[error("local changes would be overwritten: {}", display_paths(.0))]
    LocalChanges(Vec<PathBuf>),

    #[error("unsupported remote: {0}")]
    UnsupportedRemote(String),
}

impl Error {
    pub fn not_found(kind: &'static str, name: impl ToString) -> Self {
        Error::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Attach context to I/O failures, in the spirit of `anyhow::Context`
pub trait IoContext<T> {
    fn io_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;

    fn io_path_context(self, action: &str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn io_context<C, F>(self, context: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| Error::Io {
            context: context().into(),
            source,
        })
    }

    fn io_path_context(self, action: &str, path: &Path) -> Result<T> {
        self.io_context(|| format!("{action} {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn io_context_wraps_the_source_error() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        let error = result
            .io_path_context("unable to write", Path::new("a/b"))
            .unwrap_err();

        assert_eq!(error.to_string(), "unable to write a/b: denied");
        assert!(matches!(error, Error::Io { .. }));
    }

    #[test]
    fn local_changes_lists_every_path() {
        let error = Error::LocalChanges(vec![PathBuf::from("a.txt"), PathBuf::from("b/c.txt")]);

        assert_eq!(
            error.to_string(),
            "local changes would be overwritten: a.txt, b/c.txt"
        );
    }
}
