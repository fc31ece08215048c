//! Remote synchronization
//!
//! A remote is another repository reachable through a [`RemoteProvider`].
//! Providers are picked by URL scheme with [`provider_for`]:
//!
//! - `file://<path>` or a plain filesystem path: [`local::LocalProvider`]
//! - `http://`, `https://`, `ssh://` and anything else with a scheme:
//!   [`Error::UnsupportedRemote`]
//!
//! Every transfer is a fast-forward. Diverged histories are refused.

pub mod local;

use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::path::PathBuf;

pub const FILE_SCHEME: &str = "file://";
const SCHEME_SEPARATOR: &str = "://";

/// What a push or pull did to the receiving branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    UpToDate,
    FastForward {
        from: Option<ObjectId>,
        to: ObjectId,
    },
}

impl std::fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferOutcome::UpToDate => write!(f, "Everything up-to-date"),
            TransferOutcome::FastForward { from: None, to } => {
                write!(f, "new branch at {}", to.to_short_oid())
            }
            TransferOutcome::FastForward { from: Some(from), to } => {
                write!(f, "{}..{}", from.to_short_oid(), to.to_short_oid())
            }
        }
    }
}

/// One transport to another repository
pub trait RemoteProvider: std::fmt::Debug {
    fn url(&self) -> &str;

    /// Check that the remote exists and is a repository
    fn test_connection(&self) -> Result<()>;

    /// Send `branch` from `local` and fast-forward the remote branch to it
    fn push(&self, local: &Repository, branch: &BranchName) -> Result<TransferOutcome>;

    /// Fetch the remote `branch` and fast-forward the local branch to it
    ///
    /// The working tree follows when `branch` is checked out locally.
    fn pull(&self, local: &Repository, branch: &BranchName) -> Result<TransferOutcome>;

    /// Initialize `local` as a copy of the remote's checked-out branch
    ///
    /// Returns the branch that was checked out.
    fn clone_into(&self, local: &mut Repository) -> Result<BranchName>;
}

pub fn provider_for(url: &str) -> Result<Box<dyn RemoteProvider>> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::UnsupportedRemote("empty remote url".into()));
    }

    if let Some(path) = url.strip_prefix(FILE_SCHEME) {
        return Ok(Box::new(local::LocalProvider::new(url, PathBuf::from(path))));
    }
    if url.contains(SCHEME_SEPARATOR) {
        return Err(Error::UnsupportedRemote(url.to_string()));
    }

    Ok(Box::new(local::LocalProvider::new(url, PathBuf::from(url))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("https://example.com/repo")]
    #[case("http://example.com/repo")]
    #[case("ssh://git@example.com/repo")]
    #[case("ftp://example.com/repo")]
    #[case("   ")]
    fn network_and_unknown_schemes_are_unsupported(#[case] url: &str) {
        assert!(matches!(
            provider_for(url),
            Err(Error::UnsupportedRemote(_))
        ));
    }

    #[rstest]
    #[case("file:///srv/repos/project", "file:///srv/repos/project")]
    #[case("/srv/repos/project", "/srv/repos/project")]
    #[case("../project", "../project")]
    fn filesystem_urls_use_the_local_provider(#[case] url: &str, #[case] expected: &str) {
        let provider = provider_for(url).unwrap();

        assert_eq!(provider.url(), expected);
    }

    #[test]
    fn fast_forward_outcome_shows_both_ends() {
        let from = ObjectId::try_parse("a".repeat(64)).unwrap();
        let to = ObjectId::try_parse("b".repeat(64)).unwrap();

        assert_eq!(
            TransferOutcome::FastForward {
                from: Some(from),
                to: to.clone()
            }
            .to_string(),
            "aaaaaaa..bbbbbbb"
        );
        assert_eq!(
            TransferOutcome::FastForward { from: None, to }.to_string(),
            "new branch at bbbbbbb"
        );
    }
}
