//! Moving the working tree from one commit to another
//!
//! A migration compares the file tables of the current and the target commit
//! and plans one action per path that differs. Conflicts with local changes
//! and missing blobs are detected during planning, so either every action is
//! applied or the working tree and the index are left untouched.

use crate::areas::index::Index;
use crate::areas::repository::Repository;
use crate::artifacts::checkout::conflict::{ConflictMessage, ConflictType};
use crate::artifacts::index::file_status::FileStatus;
use crate::artifacts::objects::commit::FileTable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionType {
    Delete,
    Add,
    Modify,
}

pub type ActionsSet = BTreeMap<ActionType, Vec<(PathBuf, Option<ObjectId>)>>;
pub type ConflictsSet = BTreeMap<ConflictType, Vec<PathBuf>>;

pub struct Migration<'r> {
    repository: &'r Repository,
    index: &'r mut Index,
    current: &'r FileTable,
    target: &'r FileTable,
    actions: ActionsSet,
    conflicts: ConflictsSet,
}

impl<'r> Migration<'r> {
    /// `index` must be freshly scanned against `current`
    pub fn new(
        repository: &'r Repository,
        index: &'r mut Index,
        current: &'r FileTable,
        target: &'r FileTable,
    ) -> Self {
        Migration {
            repository,
            index,
            current,
            target,
            actions: ActionsSet::new(),
            conflicts: ConflictsSet::new(),
        }
    }

    pub fn actions(&self) -> &ActionsSet {
        &self.actions
    }

    pub fn apply_changes(&mut self) -> Result<()> {
        self.plan_changes()?;
        self.update_workspace()?;
        self.update_index();

        Ok(())
    }

    fn plan_changes(&mut self) -> Result<()> {
        let paths = self
            .current
            .keys()
            .chain(self.target.keys())
            .cloned()
            .collect::<BTreeSet<_>>();

        for path in paths {
            let old = self.current.get(&path);
            let new = self.target.get(&path);

            let action = match (old, new) {
                (Some(old), Some(new)) if old == new => continue,
                (Some(_), Some(_)) => ActionType::Modify,
                (None, Some(_)) => ActionType::Add,
                (Some(_), None) => ActionType::Delete,
                (None, None) => continue,
            };

            if let Some(new) = new
                && !self.repository.database().exists(new)
            {
                return Err(Error::not_found("blob", new));
            }

            self.check_for_conflict(&path, new)?;
            self.actions
                .entry(action)
                .or_default()
                .push((path, new.cloned()));
        }

        if self.conflicts.is_empty() {
            return Ok(());
        }

        for (conflict_type, paths) in &self.conflicts {
            let ConflictMessage { header, footer } = conflict_type.into();
            let paths = paths
                .iter()
                .map(|path| format!("\t{}", path.display()))
                .collect::<Vec<_>>()
                .join("\n");
            warn!("{header}\n{paths}\n{footer}");
        }

        Err(Error::LocalChanges(
            self.conflicts.values().flatten().cloned().collect(),
        ))
    }

    fn check_for_conflict(&mut self, path: &Path, new: Option<&ObjectId>) -> Result<()> {
        let entry = self.index.entry_by_path(path);

        // the working tree already holds the target state
        if let Some(entry) = entry
            && entry.worktree_hash.as_ref() == new
            && (entry.status != FileStatus::Staged || !entry.differs_from_worktree())
        {
            return Ok(());
        }

        let conflict_type = match entry.map(|entry| entry.status) {
            Some(FileStatus::Committed) => return Ok(()),
            // restaged without edits
            Some(FileStatus::Staged)
                if entry.is_some_and(|entry| {
                    entry.hash.is_some()
                        && entry.hash == entry.last_commit_hash
                        && !entry.differs_from_worktree()
                }) =>
            {
                return Ok(());
            }
            Some(FileStatus::Staged | FileStatus::Modified | FileStatus::Deleted) => {
                ConflictType::StaleFile
            }
            Some(FileStatus::Untracked) | None => {
                let workspace = self.repository.workspace();
                if !workspace.exists(path) {
                    return Ok(());
                }
                let content = workspace.read_file(path)?;
                if new == Some(&self.repository.database().hasher().hash(&content)) {
                    return Ok(());
                }
                ConflictType::UntrackedOverwritten
            }
        };

        self.conflicts
            .entry(conflict_type)
            .or_default()
            .push(path.to_path_buf());

        Ok(())
    }

    fn update_workspace(&self) -> Result<()> {
        let workspace = self.repository.workspace();

        for (action, entries) in &self.actions {
            for (path, oid) in entries {
                match (action, oid) {
                    (ActionType::Delete, _) => workspace.remove_file(path)?,
                    (ActionType::Add | ActionType::Modify, Some(oid)) => {
                        let blob = self.repository.database().parse_object_as_blob(oid)?;
                        workspace.write_file(path, blob.content())?;
                    }
                    (_, None) => {
                        return Err(Error::InvalidState(format!(
                            "no blob planned for {}",
                            path.display()
                        )));
                    }
                }
                debug!(path = %path.display(), ?action, "checked out");
            }
        }

        Ok(())
    }

    fn update_index(&mut self) {
        for (action, entries) in &self.actions {
            for (path, oid) in entries {
                match (action, oid) {
                    (ActionType::Delete, _) | (_, None) => self.index.forget(path),
                    (ActionType::Add | ActionType::Modify, Some(oid)) => {
                        self.index.track_committed(path, oid)
                    }
                }
            }
        }
    }
}
