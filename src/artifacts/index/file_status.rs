use crate::errors::{Error, Result};

/// Tracking status of a path
///
/// The numeric codes are the ones persisted in the index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileStatus {
    Untracked,
    Modified,
    Staged,
    Committed,
    Deleted,
}

impl FileStatus {
    pub fn code(&self) -> u8 {
        match self {
            FileStatus::Untracked => 0,
            FileStatus::Modified => 1,
            FileStatus::Staged => 2,
            FileStatus::Committed => 3,
            FileStatus::Deleted => 4,
        }
    }

    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(FileStatus::Untracked),
            1 => Ok(FileStatus::Modified),
            2 => Ok(FileStatus::Staged),
            3 => Ok(FileStatus::Committed),
            4 => Ok(FileStatus::Deleted),
            other => Err(Error::InvalidRepository(format!(
                "unknown index status code {other}"
            ))),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileStatus::Untracked => "untracked",
            FileStatus::Modified => "modified",
            FileStatus::Staged => "staged",
            FileStatus::Committed => "committed",
            FileStatus::Deleted => "deleted",
        }
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
