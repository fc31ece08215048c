//! Remotes that are other repositories on the local filesystem

use crate::areas::METADATA_DIR;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use crate::remote::{RemoteProvider, TransferOutcome};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LocalProvider {
    url: String,
    path: PathBuf,
}

impl LocalProvider {
    pub fn new(url: impl Into<String>, path: PathBuf) -> Self {
        LocalProvider {
            url: url.into(),
            path,
        }
    }

    /// The remote must be a repository root, not a directory somewhere inside one
    fn open(&self) -> Result<Repository> {
        if !self.path.join(METADATA_DIR).join("HEAD").is_file() {
            return Err(Error::InvalidRepository(format!(
                "remote {} is not a repository",
                self.url
            )));
        }

        Repository::new(&self.path, Box::new(std::io::sink()))
    }
}

impl RemoteProvider for LocalProvider {
    fn url(&self) -> &str {
        &self.url
    }

    fn test_connection(&self) -> Result<()> {
        let remote = self.open()?;
        remote.refs().head()?;

        Ok(())
    }

    fn push(&self, local: &Repository, branch: &BranchName) -> Result<TransferOutcome> {
        let remote = self.open()?;
        ensure_same_hash(local, &remote)?;

        let local_tip = local
            .refs()
            .read_ref(branch)?
            .ok_or_else(|| Error::not_found("branch", branch))?;

        let _lock = remote.lock()?;
        let remote_tip = remote.refs().read_ref(branch)?;
        if remote_tip.as_ref() == Some(&local_tip) {
            return Ok(TransferOutcome::UpToDate);
        }
        if let Some(remote_tip) = &remote_tip
            && !is_fast_forward(local, remote_tip, &local_tip)?
        {
            return Err(Error::InvalidState(format!(
                "push of {branch} rejected: the remote branch has commits that are not in the local history"
            )));
        }

        let copied = copy_commits(local, &remote, &local_tip)?;
        if remote.refs().is_current_branch(branch)? {
            remote.migrate_to(&local_tip)?;
        }
        remote.refs().update_ref(branch, &local_tip)?;
        info!(url = %self.url, %branch, oid = %local_tip, copied, "pushed");

        Ok(TransferOutcome::FastForward {
            from: remote_tip,
            to: local_tip,
        })
    }

    fn pull(&self, local: &Repository, branch: &BranchName) -> Result<TransferOutcome> {
        let remote = self.open()?;
        ensure_same_hash(local, &remote)?;

        let remote_tip = remote
            .refs()
            .read_ref(branch)?
            .ok_or_else(|| Error::not_found("remote branch", branch))?;

        let local_tip = local.refs().read_ref(branch)?;
        if local_tip.as_ref() == Some(&remote_tip) {
            return Ok(TransferOutcome::UpToDate);
        }
        if let Some(local_tip) = &local_tip
            && !is_fast_forward(&remote, local_tip, &remote_tip)?
        {
            return Err(Error::InvalidState(format!(
                "cannot pull {branch}: the local branch has commits that are not on the remote"
            )));
        }

        let copied = copy_commits(&remote, local, &remote_tip)?;
        if local.refs().is_current_branch(branch)? {
            local.migrate_to(&remote_tip)?;
        }
        local.refs().update_ref(branch, &remote_tip)?;
        info!(url = %self.url, %branch, oid = %remote_tip, copied, "pulled");

        Ok(TransferOutcome::FastForward {
            from: local_tip,
            to: remote_tip,
        })
    }

    fn clone_into(&self, local: &mut Repository) -> Result<BranchName> {
        let remote = self.open()?;
        local.init(remote.settings().core.hash)?;

        let branch = remote
            .refs()
            .current_branch()?
            .unwrap_or_else(BranchName::default_branch);

        let _lock = local.lock()?;
        local.refs().set_head_branch(&branch)?;
        if remote.refs().read_ref(&branch)?.is_some() {
            self.pull(local, &branch)?;
        }

        Ok(branch)
    }
}

fn ensure_same_hash(local: &Repository, remote: &Repository) -> Result<()> {
    let (ours, theirs) = (local.settings().core.hash, remote.settings().core.hash);
    if ours != theirs {
        return Err(Error::InvalidState(format!(
            "hash mismatch: local repository uses {ours}, remote uses {theirs}"
        )));
    }

    Ok(())
}

/// Whether `old_tip` is in the first-parent history of `new_tip` within `repository`
fn is_fast_forward(repository: &Repository, old_tip: &ObjectId, new_tip: &ObjectId) -> Result<bool> {
    if !repository.database().exists(old_tip) {
        return Ok(false);
    }

    repository.commit_graph().is_ancestor(old_tip, new_tip)
}

/// Copy the commits leading to `tip` that `to` lacks, with their blobs
///
/// Commits are written oldest first and each after its blobs, so a commit
/// present in `to` always has its whole history present too.
fn copy_commits(from: &Repository, to: &Repository, tip: &ObjectId) -> Result<usize> {
    let graph = from.commit_graph();

    let mut missing = Vec::new();
    let mut next = Some(tip.clone());
    while let Some(oid) = next {
        if to.database().exists(&oid) {
            break;
        }
        let commit = graph.get_commit(&oid)?;
        next = commit.parent().cloned();
        missing.push((oid, commit));
    }

    let mut copied = 0;
    for (oid, commit) in missing.iter().rev() {
        for blob_id in commit.files().values() {
            if !to.database().exists(blob_id) {
                copy_object(from, to, blob_id)?;
                copied += 1;
            }
        }
        copy_object(from, to, oid)?;
        copied += 1;
    }
    debug!(objects = copied, "copied objects");

    Ok(copied)
}

fn copy_object(from: &Repository, to: &Repository, oid: &ObjectId) -> Result<()> {
    let stored = to.database().put(&from.database().get(oid)?)?;
    if &stored != oid {
        return Err(Error::InvalidObject(format!(
            "object {oid} was stored as {stored}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::identity::StaticIdentity;
    use crate::artifacts::objects::hasher::HashAlgorithm;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::path::{Path, PathBuf};

    struct Pair {
        _dir: TempDir,
        origin: Repository,
        local: Repository,
        provider: LocalProvider,
    }

    fn repository(path: &Path, hash: HashAlgorithm) -> Repository {
        let mut repository = Repository::new(path, Box::new(std::io::sink()))
            .unwrap()
            .with_identity(Box::new(StaticIdentity::new("Jane", "jane@example.com")));
        repository.init(hash).unwrap();
        repository
    }

    fn commit_file(repository: &Repository, file: &str, content: &str) -> ObjectId {
        std::fs::write(repository.path().join(file), content).unwrap();
        repository.add(&[PathBuf::from(file)]).unwrap();
        repository.commit(&format!("write {file}")).unwrap()
    }

    #[fixture]
    fn pair() -> Pair {
        let dir = TempDir::new().unwrap();
        let origin = repository(&dir.path().join("origin"), HashAlgorithm::Sha256);
        let local = repository(&dir.path().join("local"), HashAlgorithm::Sha256);
        let provider = LocalProvider::new("origin", origin.path().to_path_buf());

        Pair {
            _dir: dir,
            origin,
            local,
            provider,
        }
    }

    fn master() -> BranchName {
        BranchName::default_branch()
    }

    #[rstest]
    fn push_copies_history_and_updates_the_checked_out_tree(pair: Pair) {
        let first = commit_file(&pair.local, "a.txt", "one\n");
        let second = commit_file(&pair.local, "b.txt", "two\n");

        let outcome = pair.provider.push(&pair.local, &master()).unwrap();

        assert_eq!(
            outcome,
            TransferOutcome::FastForward {
                from: None,
                to: second.clone()
            }
        );
        assert_eq!(pair.origin.refs().read_ref(&master()).unwrap(), Some(second));
        assert!(pair.origin.database().exists(&first));
        assert_eq!(
            std::fs::read_to_string(pair.origin.path().join("b.txt")).unwrap(),
            "two\n"
        );
    }

    #[rstest]
    fn pushing_twice_is_up_to_date(pair: Pair) {
        commit_file(&pair.local, "a.txt", "one\n");

        pair.provider.push(&pair.local, &master()).unwrap();

        assert_eq!(
            pair.provider.push(&pair.local, &master()).unwrap(),
            TransferOutcome::UpToDate
        );
    }

    #[rstest]
    fn diverged_push_is_rejected(pair: Pair) {
        commit_file(&pair.origin, "theirs.txt", "theirs\n");
        commit_file(&pair.local, "ours.txt", "ours\n");
        let remote_tip = pair.origin.refs().read_ref(&master()).unwrap();

        let result = pair.provider.push(&pair.local, &master());

        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(pair.origin.refs().read_ref(&master()).unwrap(), remote_tip);
    }

    #[rstest]
    fn pull_fast_forwards_the_current_branch(pair: Pair) {
        let tip = commit_file(&pair.origin, "a.txt", "from origin\n");

        let outcome = pair.provider.pull(&pair.local, &master()).unwrap();

        assert_eq!(
            outcome,
            TransferOutcome::FastForward {
                from: None,
                to: tip.clone()
            }
        );
        assert_eq!(pair.local.refs().read_head().unwrap(), Some(tip));
        assert_eq!(
            std::fs::read_to_string(pair.local.path().join("a.txt")).unwrap(),
            "from origin\n"
        );
    }

    #[rstest]
    fn pull_refuses_diverged_history(pair: Pair) {
        commit_file(&pair.origin, "a.txt", "theirs\n");
        let ours = commit_file(&pair.local, "b.txt", "ours\n");

        let result = pair.provider.pull(&pair.local, &master());

        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(pair.local.refs().read_head().unwrap(), Some(ours));
    }

    #[rstest]
    fn pull_of_a_missing_branch_is_not_found(pair: Pair) {
        let result = pair.provider.pull(&pair.local, &master());

        assert!(matches!(result, Err(Error::NotFound { .. })));
    }

    #[rstest]
    fn clone_checks_out_the_remote_branch(pair: Pair) {
        let tip = commit_file(&pair.origin, "a.txt", "cloned\n");
        let target = pair._dir.path().join("clone");
        let mut clone = Repository::new(&target, Box::new(std::io::sink())).unwrap();

        let branch = RemoteProvider::clone_into(&pair.provider, &mut clone).unwrap();

        assert_eq!(branch, master());
        assert_eq!(clone.refs().read_head().unwrap(), Some(tip));
        assert_eq!(
            std::fs::read_to_string(target.join("a.txt")).unwrap(),
            "cloned\n"
        );
    }

    #[test]
    fn hash_mismatch_is_refused() {
        let dir = TempDir::new().unwrap();
        let origin = repository(&dir.path().join("origin"), HashAlgorithm::Sha1);
        let local = repository(&dir.path().join("local"), HashAlgorithm::Sha256);
        commit_file(&local, "a.txt", "one\n");
        let provider = LocalProvider::new("origin", origin.path().to_path_buf());

        let result = provider.push(&local, &master());

        assert!(matches!(result, Err(Error::InvalidState(_))));
    }

    #[test]
    fn a_plain_directory_is_not_a_remote() {
        let dir = TempDir::new().unwrap();
        let provider = LocalProvider::new("nowhere", dir.path().to_path_buf());

        assert!(matches!(
            provider.test_connection(),
            Err(Error::InvalidRepository(_))
        ));
    }
}
