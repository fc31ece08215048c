use crate::areas::index::Index;
use crate::areas::refs::Head;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::index::file_status::FileStatus;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{FileChange, IndexChangeType, WorkspaceChangeType};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

pub type ChangeSet = BTreeMap<PathBuf, FileChange>;

/// Snapshot of the repository state as reported by `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// Checked-out branch, `None` when HEAD is detached
    pub branch: Option<BranchName>,
    /// Commit HEAD resolves to, `None` before the first commit
    pub head: Option<ObjectId>,
    pub changes: ChangeSet,
    pub committed_files: Vec<PathBuf>,
}

impl StatusInfo {
    /// Build from a freshly scanned index
    pub fn new(head: Head, head_oid: Option<ObjectId>, index: &Index) -> Self {
        let branch = match head {
            Head::Branch(branch_name) => Some(branch_name),
            Head::Detached(_) => None,
        };

        let changes = index
            .files()
            .into_iter()
            .filter_map(|entry| Some((entry.path.clone(), FileChange::from_entry(entry)?)))
            .collect();
        let committed_files = index
            .entries_with_status(FileStatus::Committed)
            .into_iter()
            .map(|entry| entry.path.clone())
            .collect();

        StatusInfo {
            branch,
            head: head_oid,
            changes,
            committed_files,
        }
    }

    pub fn index_changes(&self) -> impl Iterator<Item = (&PathBuf, &FileChange)> {
        self.changes
            .iter()
            .filter(|(_, change)| change.index_change != IndexChangeType::None)
    }

    pub fn workspace_changes(&self) -> impl Iterator<Item = (&PathBuf, &FileChange)> {
        self.changes.iter().filter(|(_, change)| {
            !matches!(
                change.workspace_change,
                WorkspaceChangeType::None | WorkspaceChangeType::Untracked
            )
        })
    }

    pub fn untracked_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.changes
            .iter()
            .filter(|(_, change)| change.is_untracked())
            .map(|(path, _)| path)
    }

    pub fn staged_count(&self) -> usize {
        self.index_changes().count()
    }

    pub fn is_clean(&self) -> bool {
        self.changes.is_empty()
    }

    /// One `XY path` line per changed path
    pub fn write_porcelain(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        for (path, change) in &self.changes {
            writeln!(writer, "{change} {}", path.display())?;
        }

        Ok(())
    }

    pub fn write_long(&self, writer: &mut dyn Write) -> std::io::Result<()> {
        match (&self.branch, &self.head) {
            (Some(branch), _) => writeln!(writer, "On branch {branch}")?,
            (None, Some(head)) => writeln!(
                writer,
                "{} {}",
                "HEAD detached at".red(),
                head.to_short_oid()
            )?,
            (None, None) => writeln!(writer, "{}", "HEAD detached".red())?,
        }
        if self.head.is_none() {
            writeln!(writer, "\nNo commits yet")?;
        }

        if self.index_changes().next().is_some() {
            writeln!(writer, "\nChanges to be committed:")?;
            for (path, change) in self.index_changes() {
                writeln!(writer, "{}{}", change.index_label(), path.display().to_string().green())?;
            }
        }

        if self.workspace_changes().next().is_some() {
            writeln!(writer, "\nChanges not staged for commit:")?;
            for (path, change) in self.workspace_changes() {
                writeln!(writer, "{}{}", change.workspace_label(), path.display().to_string().red())?;
            }
        }

        if self.untracked_files().next().is_some() {
            writeln!(writer, "\nUntracked files:")?;
            for path in self.untracked_files() {
                writeln!(writer, "{:>8}{}", "", path.display().to_string().red())?;
            }
        }

        if self.is_clean() {
            writeln!(writer, "\nnothing to commit, working tree clean")?;
        } else if self.staged_count() == 0 {
            writeln!(writer, "\nno changes added to commit (use \"mim add\")")?;
        }

        Ok(())
    }
}
