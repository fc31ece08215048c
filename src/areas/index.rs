//! Index (staging area and file tracker)
//!
//! The index keeps one entry per path and drives each entry through the
//! status state machine:
//!
//! ```text
//! Untracked ──stage──▶ Staged ──commit──▶ Committed ──edit──▶ Modified
//!                        ▲  ▲                │  │                │
//!                        │  └──────stage─────┼──┼────────────────┘
//!                        │                   │  └──delete──▶ Deleted
//!                        └────────rm─────────┘
//! ```
//!
//! A Staged entry holds the snapshot taken by `add` until the next commit,
//! even if the file is edited or deleted afterwards. A Staged entry without
//! a hash is a staged removal. Unstaging sends a Staged entry back to
//! whatever a fresh scan would report: Untracked without a last-commit hash,
//! Committed when the content matches it and Modified otherwise.
//!
//! ## Persistence
//!
//! The index file is rewritten as a whole through a temp file and a rename.
//! A missing file loads as an empty index.

use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::index::file_status::FileStatus;
use crate::artifacts::index::index_entry::IndexEntry;
use crate::artifacts::objects::commit::FileTable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, IoContext, Result};
use fake::rand;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.mim/index`)
    path: Box<Path>,
    entries: BTreeMap<PathBuf, IndexEntry>,
    /// Set when the entries differ from what was loaded
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
            changed: false,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_entries(path: Box<Path>, entries: impl IntoIterator<Item = IndexEntry>) -> Self {
        Index {
            path,
            entries: entries
                .into_iter()
                .map(|entry| (entry.path.clone(), entry))
                .collect(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reload entries from disk, discarding in-memory changes
    pub fn rehydrate(&mut self) -> Result<()> {
        self.entries.clear();
        self.changed = false;

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).io_path_context("unable to read index", &self.path),
        };

        for line in content.lines().filter(|line| !line.trim().is_empty()) {
            let entry = IndexEntry::parse(line)?;
            self.entries.insert(entry.path.clone(), entry);
        }

        Ok(())
    }

    /// Persist the entries if anything changed since loading
    pub fn write_updates(&mut self) -> Result<()> {
        if !self.changed {
            return Ok(());
        }

        let mut content = String::new();
        for entry in self.entries.values() {
            content.push_str(&entry.serialize()?);
            content.push('\n');
        }

        let index_dir = self
            .path
            .parent()
            .ok_or_else(|| Error::InvalidRepository(format!("invalid index path {:?}", self.path)))?;
        let temp_path = index_dir.join(format!("index.tmp-{}", rand::random::<u32>()));

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
            .io_path_context("unable to open index", &temp_path)?;
        file.write_all(content.as_bytes())
            .io_path_context("unable to write index", &temp_path)?;
        file.sync_all()
            .io_path_context("unable to flush index", &temp_path)?;

        std::fs::rename(&temp_path, &self.path)
            .io_path_context("unable to rename index to", &self.path)?;

        self.changed = false;
        debug!(entries = self.entries.len(), "wrote index");

        Ok(())
    }

    pub fn entry_by_path(&self, path: &Path) -> Option<&IndexEntry> {
        self.entries.get(path)
    }

    /// All entries sorted by path
    pub fn files(&self) -> Vec<&IndexEntry> {
        self.entries.values().collect()
    }

    /// Staged entries sorted by path
    pub fn staged_files(&self) -> Vec<&IndexEntry> {
        self.entries_with_status(FileStatus::Staged)
    }

    pub fn entries_with_status(&self, status: FileStatus) -> Vec<&IndexEntry> {
        self.entries
            .values()
            .filter(|entry| entry.status == status)
            .collect()
    }

    /// Staged path to blob mapping, as fed to a commit
    pub fn staged_table(&self) -> FileTable {
        self.staged_files()
            .into_iter()
            .filter_map(|entry| Some((entry.path.clone(), entry.hash.clone()?)))
            .collect()
    }

    /// Staged removals: paths the next commit drops from its parent's table
    pub fn removed_paths(&self) -> BTreeSet<PathBuf> {
        self.staged_files()
            .into_iter()
            .filter(|entry| entry.is_staged_removal())
            .map(|entry| entry.path.clone())
            .collect()
    }

    /// Rescan the working tree and recompute every status
    ///
    /// `head` is the file table of the current commit; it fills in the
    /// last-commit hash of paths the index has not seen yet. Staged entries
    /// keep their snapshot whatever happens to the file afterwards.
    pub fn update_status(&mut self, workspace: &Workspace, database: &Database, head: &FileTable) -> Result<()> {
        let on_disk = workspace.list_files()?;
        let mut updated = BTreeMap::new();

        for path in &on_disk {
            let content = workspace.read_file(path)?;
            let hash = database.hasher().hash(&content);

            let entry = match self.entries.get(path) {
                Some(entry) if entry.status == FileStatus::Staged => entry.clone(),
                previous => {
                    let last_commit_hash = previous
                        .map(|entry| entry.last_commit_hash.clone())
                        .unwrap_or_else(|| head.get(path).cloned());
                    let status = IndexEntry::status_for(&hash, last_commit_hash.as_ref());

                    IndexEntry::new(path.clone(), Some(hash.clone()), last_commit_hash, status)
                }
            };

            updated.insert(path.clone(), entry.with_worktree_hash(Some(hash)));
        }

        for (path, entry) in &self.entries {
            if updated.contains_key(path) || entry.status != FileStatus::Staged {
                continue;
            }

            updated.insert(path.clone(), entry.clone().with_worktree_hash(None));
        }

        let known_paths = self
            .entries
            .iter()
            .filter_map(|(path, entry)| Some((path, entry.last_commit_hash.clone()?)))
            .chain(head.iter().map(|(path, oid)| (path, oid.clone())));

        for (path, last_commit_hash) in known_paths {
            if updated.contains_key(path) || workspace.is_ignored(path) {
                continue;
            }

            updated.insert(
                path.clone(),
                IndexEntry::new(path.clone(), None, Some(last_commit_hash), FileStatus::Deleted),
            );
        }

        if updated != self.entries {
            self.changed = true;
        }
        self.entries = updated;

        Ok(())
    }

    /// Snapshot a file's current content into the object store and mark it Staged
    pub fn stage_file(&mut self, path: &Path, workspace: &Workspace, database: &Database) -> Result<()> {
        if !workspace.exists(path) {
            return Err(Error::not_found("file", path.display()));
        }

        let content = workspace.read_file(path)?;
        let hash = database.put(&content)?;

        let last_commit_hash = self
            .entries
            .get(path)
            .and_then(|entry| entry.last_commit_hash.clone());

        self.entries.insert(
            path.to_path_buf(),
            IndexEntry::new(path.to_path_buf(), Some(hash.clone()), last_commit_hash, FileStatus::Staged)
                .with_worktree_hash(Some(hash)),
        );
        self.changed = true;
        debug!(path = %path.display(), "staged");

        Ok(())
    }

    /// Take a path out of the staging area
    ///
    /// The entry goes back to whatever its working-tree content is relative
    /// to the last commit.
    pub fn unstage_file(&mut self, path: &Path) -> Result<()> {
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| Error::not_found("index entry", path.display()))?;

        if entry.status != FileStatus::Staged {
            return Err(Error::InvalidState(format!(
                "{} is {}, not staged",
                path.display(),
                entry.status
            )));
        }

        match (entry.worktree_hash.clone(), entry.is_tracked()) {
            (Some(worktree_hash), _) => {
                entry.status = IndexEntry::status_for(&worktree_hash, entry.last_commit_hash.as_ref());
                entry.hash = Some(worktree_hash);
            }
            (None, true) => {
                entry.status = FileStatus::Deleted;
                entry.hash = None;
            }
            (None, false) => {
                self.entries.remove(path);
            }
        }
        self.changed = true;
        debug!(path = %path.display(), "unstaged");

        Ok(())
    }

    /// Stop tracking a path
    ///
    /// A committed path is deleted from the working tree and staged for
    /// removal, so the next commit drops it. An entry that was never committed
    /// is dropped once its file is gone from disk.
    pub fn remove_file(&mut self, path: &Path, workspace: &Workspace) -> Result<()> {
        let entry = self
            .entries
            .get_mut(path)
            .ok_or_else(|| Error::not_found("index entry", path.display()))?;

        match (entry.is_tracked(), entry.status) {
            (true, FileStatus::Committed | FileStatus::Deleted) => {
                workspace.remove_file(path)?;
                entry.hash = None;
                entry.worktree_hash = None;
                entry.status = FileStatus::Staged;
            }
            (true, _) if entry.is_staged_removal() => {}
            (true, status) => {
                return Err(Error::InvalidState(format!(
                    "{} has {status} changes",
                    path.display()
                )));
            }
            (false, _) if workspace.exists(path) => {
                return Err(Error::InvalidState(format!(
                    "{} is not tracked",
                    path.display()
                )));
            }
            (false, _) => {
                self.entries.remove(path);
            }
        }

        self.changed = true;
        debug!(path = %path.display(), "removed");

        Ok(())
    }

    /// Fold a new commit into the index
    ///
    /// Staged snapshots become Committed, staged removals leave the index and
    /// every path of `table` records its committed hash. Unstaged changes
    /// (Modified, Deleted) are left for a later commit.
    pub fn mark_committed(&mut self, table: &FileTable) {
        self.entries.retain(|_, entry| !entry.is_staged_removal());

        for entry in self.entries.values_mut() {
            if let Some(oid) = table.get(&entry.path) {
                entry.last_commit_hash = Some(oid.clone());
            }
            if entry.status == FileStatus::Staged {
                entry.status = match &entry.worktree_hash {
                    Some(worktree_hash) => {
                        let status = IndexEntry::status_for(worktree_hash, entry.last_commit_hash.as_ref());
                        entry.hash = Some(worktree_hash.clone());
                        status
                    }
                    None => {
                        entry.hash = None;
                        FileStatus::Deleted
                    }
                };
            }
        }

        self.changed = true;
    }

    /// Record that checkout wrote `oid` to `path`
    pub fn track_committed(&mut self, path: &Path, oid: &ObjectId) {
        self.entries.insert(
            path.to_path_buf(),
            IndexEntry::new(path.to_path_buf(), Some(oid.clone()), Some(oid.clone()), FileStatus::Committed)
                .with_worktree_hash(Some(oid.clone())),
        );
        self.changed = true;
    }

    /// Drop the entry of a path checkout removed
    pub fn forget(&mut self, path: &Path) {
        if self.entries.remove(path).is_some() {
            self.changed = true;
        }
    }
}
