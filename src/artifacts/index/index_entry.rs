//! Index entry representation
//!
//! Each entry tracks a single path with:
//! - the hash of its current content, or of the staged snapshot while staged
//!   (absent once the file is deleted, or for a staged removal)
//! - the hash recorded by the last commit (absent for never-committed files)
//! - its [`FileStatus`]
//!
//! The working-tree hash is recomputed by every scan and never persisted.

use crate::artifacts::index::FIELD_SEPARATOR;
use crate::artifacts::index::file_status::FileStatus;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Eq, new)]
pub struct IndexEntry {
    /// File path relative to the repository root
    pub path: PathBuf,
    /// Hash of the current content, or of the staged snapshot
    pub hash: Option<ObjectId>,
    /// Hash recorded by the last commit touching this path
    pub last_commit_hash: Option<ObjectId>,
    pub status: FileStatus,
    /// Hash of the file on disk at the last scan, `None` when it is missing
    #[new(default)]
    pub worktree_hash: Option<ObjectId>,
}

impl IndexEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_tracked(&self) -> bool {
        self.last_commit_hash.is_some()
    }

    /// Staged with no snapshot: the next commit drops the path
    pub fn is_staged_removal(&self) -> bool {
        self.status == FileStatus::Staged && self.hash.is_none()
    }

    /// Whether the working tree no longer matches the staged snapshot
    pub fn differs_from_worktree(&self) -> bool {
        self.hash != self.worktree_hash
    }

    pub fn with_worktree_hash(mut self, worktree_hash: Option<ObjectId>) -> Self {
        self.worktree_hash = worktree_hash;
        self
    }

    /// Status a file with `hash` has relative to the last commit
    pub fn status_for(hash: &ObjectId, last_commit_hash: Option<&ObjectId>) -> FileStatus {
        match last_commit_hash {
            None => FileStatus::Untracked,
            Some(last) if last == hash => FileStatus::Committed,
            Some(_) => FileStatus::Modified,
        }
    }

    pub fn serialize(&self) -> Result<String> {
        let path = self
            .path
            .to_str()
            .ok_or_else(|| Error::InvalidState(format!("non UTF-8 path {:?}", self.path)))?;

        if path.contains(FIELD_SEPARATOR) || path.contains('\n') {
            return Err(Error::InvalidState(format!(
                "path {path:?} cannot be stored in the index"
            )));
        }

        Ok(format!(
            "{path}\t{}\t{}\t{}",
            self.hash.as_ref().map(ObjectId::as_ref).unwrap_or(""),
            self.last_commit_hash
                .as_ref()
                .map(ObjectId::as_ref)
                .unwrap_or(""),
            self.status.code()
        ))
    }

    pub fn parse(line: &str) -> Result<Self> {
        let fields = line.split(FIELD_SEPARATOR).collect::<Vec<_>>();

        let [path, hash, last_commit_hash, code] = fields.as_slice() else {
            return Err(Error::InvalidRepository(format!(
                "malformed index line {line:?}"
            )));
        };

        let code = code
            .trim()
            .parse::<u8>()
            .map_err(|_| Error::InvalidRepository(format!("malformed index line {line:?}")))?;

        Ok(IndexEntry {
            path: PathBuf::from(path),
            hash: Self::parse_optional_oid(hash)?,
            last_commit_hash: Self::parse_optional_oid(last_commit_hash)?,
            status: FileStatus::from_code(code)?,
            worktree_hash: None,
        })
    }

    fn parse_optional_oid(value: &str) -> Result<Option<ObjectId>> {
        if value.is_empty() {
            Ok(None)
        } else {
            ObjectId::try_parse(value).map(Some)
        }
    }
}

/// Entries compare by their persisted fields only
impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.hash == other.hash
            && self.last_commit_hash == other.last_commit_hash
            && self.status == other.status
    }
}
