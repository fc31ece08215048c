use crate::artifacts::index::file_status::FileStatus;
use crate::artifacts::index::index_entry::IndexEntry;
use colored::Colorize;

const LABEL_WIDTH: usize = 8;

/// Change recorded in the staging area, relative to the last commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum IndexChangeType {
    #[default]
    None,
    Added,
    Modified,
    Deleted,
}

impl From<&IndexChangeType> for &str {
    fn from(change: &IndexChangeType) -> Self {
        match change {
            IndexChangeType::None => " ",
            IndexChangeType::Added => "A",
            IndexChangeType::Modified => "M",
            IndexChangeType::Deleted => "D",
        }
    }
}

/// Change in the working tree that has not been staged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WorkspaceChangeType {
    #[default]
    None,
    Untracked,
    Modified,
    Deleted,
}

impl From<&WorkspaceChangeType> for &str {
    fn from(change: &WorkspaceChangeType) -> Self {
        match change {
            WorkspaceChangeType::None => " ",
            WorkspaceChangeType::Untracked => "?",
            WorkspaceChangeType::Modified => "M",
            WorkspaceChangeType::Deleted => "D",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FileChange {
    pub index_change: IndexChangeType,
    pub workspace_change: WorkspaceChangeType,
}

impl FileChange {
    /// Classify an index entry; `None` for committed files
    ///
    /// A staged entry reports both columns: the snapshot against the last
    /// commit and the working tree against the snapshot.
    pub fn from_entry(entry: &IndexEntry) -> Option<Self> {
        let (index_change, workspace_change) = match entry.status {
            FileStatus::Committed => return None,
            FileStatus::Staged if entry.is_staged_removal() => {
                (IndexChangeType::Deleted, WorkspaceChangeType::None)
            }
            FileStatus::Staged => {
                let index_change = if entry.is_tracked() {
                    IndexChangeType::Modified
                } else {
                    IndexChangeType::Added
                };
                let workspace_change = match &entry.worktree_hash {
                    None => WorkspaceChangeType::Deleted,
                    Some(_) if entry.differs_from_worktree() => WorkspaceChangeType::Modified,
                    Some(_) => WorkspaceChangeType::None,
                };
                (index_change, workspace_change)
            }
            FileStatus::Modified => (IndexChangeType::None, WorkspaceChangeType::Modified),
            FileStatus::Deleted => (IndexChangeType::None, WorkspaceChangeType::Deleted),
            FileStatus::Untracked => (IndexChangeType::None, WorkspaceChangeType::Untracked),
        };

        Some(FileChange {
            index_change,
            workspace_change,
        })
    }

    pub fn is_untracked(&self) -> bool {
        self.workspace_change == WorkspaceChangeType::Untracked
    }

    /// Colored, padded label for the "Changes to be committed" section
    pub fn index_label(&self) -> String {
        let label = match self.index_change {
            IndexChangeType::Added => "new file:   ".green(),
            IndexChangeType::Modified => "modified:   ".green(),
            IndexChangeType::Deleted => "deleted:    ".green(),
            IndexChangeType::None => "".normal(),
        };

        format!("{:>width$}{}", "", label, width = LABEL_WIDTH)
    }

    /// Colored, padded label for the "Changes not staged" section
    pub fn workspace_label(&self) -> String {
        let label = match self.workspace_change {
            WorkspaceChangeType::Modified => "modified:   ".red(),
            WorkspaceChangeType::Deleted => "deleted:    ".red(),
            WorkspaceChangeType::None | WorkspaceChangeType::Untracked => "".normal(),
        };

        format!("{:>width$}{}", "", label, width = LABEL_WIDTH)
    }
}

/// Two-letter porcelain code: staged column then working-tree column
impl std::fmt::Display for FileChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_untracked() {
            return write!(f, "??");
        }

        let index_str: &str = (&self.index_change).into();
        let workspace_str: &str = (&self.workspace_change).into();
        write!(f, "{index_str}{workspace_str}")
    }
}
