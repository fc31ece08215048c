//! References (branches and HEAD)
//!
//! References are human-readable names pointing to commits:
//! - `refs/heads/<branch>` holds the tip commit ID of a branch
//! - `HEAD` is either symbolic (`ref: refs/heads/<branch>`) or detached (a raw commit ID)
//!
//! ## Writes and reads
//!
//! Every write goes to a temp file next to the target and is renamed into
//! place, so a reader sees either the old or the new content. A ref file that
//! still fails to parse after a few retries is treated as absent, which callers
//! read as "no commits yet".

use crate::artifacts::branch::branch_name::{BranchName, REF_PREFIX};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, IoContext, Result};
use derive_new::new;
use fake::rand;
use std::io::Write;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

static SYMREF_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(SYMREF_REGEX));

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";

const REF_READ_ATTEMPTS: usize = 3;
const REF_READ_BACKOFF: Duration = Duration::from_millis(5);

/// Where HEAD currently points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// HEAD names a branch, which may not have any commit yet
    Branch(BranchName),
    /// HEAD holds a raw commit ID
    Detached(ObjectId),
}

/// Content of a ref file
#[derive(Debug, Clone)]
enum SymRefOrOid {
    SymRef(String),
    Oid(ObjectId),
}

impl SymRefOrOid {
    fn parse(content: &str) -> Result<Option<SymRefOrOid>> {
        let content = content.trim();

        if content.is_empty() {
            return Ok(None);
        }

        let symref_regex = SYMREF_PATTERN
            .as_ref()
            .map_err(|e| Error::InvalidState(format!("invalid symref regex: {e}")))?;

        match symref_regex.captures(content) {
            Some(symref_match) => Ok(Some(SymRefOrOid::SymRef(symref_match[1].to_string()))),
            None => Ok(Some(SymRefOrOid::Oid(ObjectId::try_parse(content)?))),
        }
    }
}

/// Reference manager rooted at the metadata directory
#[derive(Debug, new)]
pub struct Refs {
    path: Box<Path>,
}

impl Refs {
    /// Read a ref file, retrying while its content is unparseable
    ///
    /// `Ok(None)` covers a missing file, an empty file and a file that stayed
    /// unparseable for every attempt.
    fn read_ref_file(&self, path: &Path) -> Result<Option<SymRefOrOid>> {
        for attempt in 1..=REF_READ_ATTEMPTS {
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(e).io_path_context("unable to read ref file", path),
            };

            match SymRefOrOid::parse(&content) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!(path = %path.display(), attempt, error = %e, "unreadable ref file");
                    std::thread::sleep(REF_READ_BACKOFF);
                }
            }
        }

        Ok(None)
    }

    /// Where HEAD points
    ///
    /// A missing HEAD means the directory is not a repository.
    pub fn head(&self) -> Result<Head> {
        let head_path = self.head_path();
        if !head_path.exists() {
            return Err(Error::InvalidRepository(format!(
                "missing {}",
                head_path.display()
            )));
        }

        match self.read_ref_file(&head_path)? {
            Some(SymRefOrOid::SymRef(target)) => {
                Ok(Head::Branch(BranchName::try_parse_ref_path(&target)?))
            }
            Some(SymRefOrOid::Oid(oid)) => Ok(Head::Detached(oid)),
            None => Err(Error::InvalidRepository(format!(
                "unreadable {}",
                head_path.display()
            ))),
        }
    }

    /// The checked-out branch, `None` when HEAD is detached
    pub fn current_branch(&self) -> Result<Option<BranchName>> {
        match self.head()? {
            Head::Branch(branch_name) => Ok(Some(branch_name)),
            Head::Detached(_) => Ok(None),
        }
    }

    pub fn is_current_branch(&self, branch_name: &BranchName) -> Result<bool> {
        Ok(self.current_branch()?.as_ref() == Some(branch_name))
    }

    /// Commit ID HEAD resolves to, `None` when there are no commits yet
    pub fn read_head(&self) -> Result<Option<ObjectId>> {
        match self.head()? {
            Head::Branch(branch_name) => self.read_ref(&branch_name),
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    /// Tip of a branch, `None` when the branch does not exist or is unreadable
    pub fn read_ref(&self, branch_name: &BranchName) -> Result<Option<ObjectId>> {
        let ref_path = self.heads_path().join(branch_name.to_path());

        match self.read_ref_file(&ref_path)? {
            Some(SymRefOrOid::Oid(oid)) => Ok(Some(oid)),
            Some(SymRefOrOid::SymRef(target)) => Err(Error::InvalidRepository(format!(
                "branch {branch_name} is a symbolic ref to {target}"
            ))),
            None => Ok(None),
        }
    }

    pub fn branch_exists(&self, branch_name: &BranchName) -> bool {
        self.heads_path().join(branch_name.to_path()).is_file()
    }

    /// Advance whatever HEAD resolves to: the current branch, or HEAD itself when detached
    pub fn update_head(&self, oid: &ObjectId) -> Result<()> {
        match self.head()? {
            Head::Branch(branch_name) => self.update_ref(&branch_name, oid),
            Head::Detached(_) => self.set_head_detached(oid),
        }
    }

    pub fn update_ref(&self, branch_name: &BranchName, oid: &ObjectId) -> Result<()> {
        let ref_path = self.heads_path().join(branch_name.to_path());
        self.update_ref_file(&ref_path, oid.as_ref())?;
        debug!(branch = %branch_name, oid = %oid, "moved branch");

        Ok(())
    }

    pub fn set_head_branch(&self, branch_name: &BranchName) -> Result<()> {
        self.update_ref_file(&self.head_path(), &format!("ref: {}", branch_name.to_ref_path()))?;
        debug!(branch = %branch_name, "HEAD attached");

        Ok(())
    }

    pub fn set_head_detached(&self, oid: &ObjectId) -> Result<()> {
        self.update_ref_file(&self.head_path(), oid.as_ref())?;
        debug!(oid = %oid, "HEAD detached");

        Ok(())
    }

    /// Replace a ref file's content through a temp file and a rename
    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::InvalidRepository(format!("invalid ref path {path:?}")))?;
        std::fs::create_dir_all(parent).io_path_context("unable to create ref directory", parent)?;

        let temp_path = parent.join(format!(".tmp-ref-{}", rand::random::<u32>()));
        let mut temp_file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .io_path_context("unable to open ref file", &temp_path)?;
        temp_file
            .write_all(format!("{raw_ref}\n").as_bytes())
            .io_path_context("unable to write ref file", &temp_path)?;
        temp_file
            .sync_all()
            .io_path_context("unable to flush ref file", &temp_path)?;

        std::fs::rename(&temp_path, path).io_path_context("unable to rename ref file to", path)
    }

    pub fn create_branch(&self, name: &BranchName, source_oid: &ObjectId) -> Result<()> {
        if self.branch_exists(name) {
            return Err(Error::InvalidState(format!("branch {name} already exists")));
        }

        self.update_ref(name, source_oid)
    }

    /// Delete a branch, returning the commit it pointed to
    pub fn delete_branch(&self, name: &BranchName) -> Result<ObjectId> {
        if self.is_current_branch(name)? {
            return Err(Error::InvalidState(format!(
                "cannot delete branch {name}: it is checked out"
            )));
        }

        let branch_path = self.heads_path().join(name.to_path());
        let oid = self
            .read_ref(name)?
            .ok_or_else(|| Error::not_found("branch", name))?;

        std::fs::remove_file(&branch_path)
            .io_path_context("unable to delete branch file", &branch_path)?;
        self.prune_branch_empty_parent_dirs(&branch_path)?;
        debug!(branch = %name, "deleted branch");

        Ok(oid)
    }

    /// All branch names, sorted
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let heads_path = self.heads_path();

        let mut branches = WalkDir::new(&heads_path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with(".tmp-ref-"))
            .filter_map(|entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                let name = relative_path.to_str()?.replace(std::path::MAIN_SEPARATOR, "/");
                BranchName::try_parse(name).ok()
            })
            .collect::<Vec<_>>();

        branches.sort();
        Ok(branches)
    }

    fn prune_branch_empty_parent_dirs(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.heads_path().as_ref()
            && parent
                .read_dir()
                .io_path_context("unable to list branch directory", parent)?
                .next()
                .is_none()
        {
            std::fs::remove_dir(parent)
                .io_path_context("unable to remove empty branch directory", parent)?;
            self.prune_branch_empty_parent_dirs(parent)?;
        }

        Ok(())
    }

    pub fn head_path(&self) -> Box<Path> {
        self.path.join(HEAD_REF_NAME).into_boxed_path()
    }

    pub fn heads_path(&self) -> Box<Path> {
        self.path
            .join(REF_PREFIX.trim_end_matches('/'))
            .into_boxed_path()
    }
}
