use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::{Error, Result};
use crate::remote::{TransferOutcome, provider_for};
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const DEFAULT_REMOTE: &str = "origin";

impl Repository {
    /// Register a remote; the URL must name a supported, reachable repository
    pub fn remote_add(&self, name: &str, url: &str) -> Result<()> {
        let _lock = self.lock()?;
        provider_for(url)?.test_connection()?;

        let mut remotes = self.remotes()?;
        remotes.add(name, url)?;
        remotes.save(&self.config_path())?;
        info!(name, url, "added remote");

        Ok(())
    }

    pub fn remote_list(&self) -> Result<Vec<(String, String)>> {
        let remotes = self
            .remotes()?
            .iter()
            .map(|(name, url)| (name.to_string(), url.to_string()))
            .collect::<Vec<_>>();

        for (name, url) in &remotes {
            self.print(format!("{name}\t{url}"))?;
        }

        Ok(remotes)
    }

    /// Fast-forward the remote's copy of `branch` (default: the current branch)
    pub fn push(&self, remote: &str, branch: Option<&str>) -> Result<TransferOutcome> {
        let url = self.remotes()?.url(remote)?.to_string();
        let branch = self.target_branch(branch)?;

        let outcome = provider_for(&url)?.push(self, &branch)?;
        match &outcome {
            TransferOutcome::UpToDate => self.print(&outcome)?,
            _ => self.print(format!("To {url}\n   {outcome}  {branch} -> {branch}"))?,
        }

        Ok(outcome)
    }

    /// Fast-forward the local `branch` (default: the current branch) to the remote's
    pub fn pull(&self, remote: &str, branch: Option<&str>) -> Result<TransferOutcome> {
        let _lock = self.lock()?;
        let url = self.remotes()?.url(remote)?.to_string();
        let branch = self.target_branch(branch)?;

        let outcome = provider_for(&url)?.pull(self, &branch)?;
        match &outcome {
            TransferOutcome::UpToDate => self.print("Already up to date.")?,
            _ => self.print(format!("From {url}\n   {outcome}  {branch} -> {branch}"))?,
        }

        Ok(outcome)
    }

    /// Create a repository at `path` from the one at `url`, remembered as `origin`
    pub fn clone_remote(url: &str, path: &Path, writer: Box<dyn Write>) -> Result<Self> {
        let provider = provider_for(url)?;
        provider.test_connection()?;

        if path.join(crate::areas::METADATA_DIR).exists() {
            return Err(Error::InvalidState(format!(
                "{} already contains a repository",
                path.display()
            )));
        }

        let mut repository = Repository::new(path, writer)?;
        let branch = provider.clone_into(&mut repository)?;

        let mut remotes = repository.remotes()?;
        remotes.add(DEFAULT_REMOTE, url)?;
        remotes.save(&repository.config_path())?;

        info!(url, path = %repository.path().display(), %branch, "cloned");
        repository.print(format!("Cloned {url} on branch '{branch}'"))?;

        Ok(repository)
    }

    fn target_branch(&self, branch: Option<&str>) -> Result<BranchName> {
        match branch {
            Some(branch) => BranchName::try_parse(branch),
            None => self.refs().current_branch()?.ok_or_else(|| {
                Error::InvalidState("HEAD is detached: name the branch to transfer".into())
            }),
        }
    }
}
