use crate::artifacts::branch::{DEFAULT_BRANCH, INVALID_BRANCH_NAME_REGEX};
use crate::errors::{Error, Result};
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Prefix of every branch ref, relative to the metadata directory
pub const REF_PREFIX: &str = "refs/heads/";

static INVALID_BRANCH_NAME_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(INVALID_BRANCH_NAME_REGEX));

/// A validated branch name such as `master` or `feature/login`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(Error::InvalidBranchName(
                "branch name cannot be empty".to_string(),
            ));
        }

        let re = INVALID_BRANCH_NAME_PATTERN
            .as_ref()
            .map_err(|e| Error::InvalidState(format!("invalid branch name regex: {e}")))?;

        if re.is_match(&name) {
            Err(Error::InvalidBranchName(name))
        } else {
            Ok(Self(name))
        }
    }

    /// Parse the target of a symbolic ref, e.g. `refs/heads/master`
    pub fn try_parse_ref_path(ref_path: &str) -> Result<Self> {
        let name = ref_path.strip_prefix(REF_PREFIX).ok_or_else(|| {
            Error::InvalidRepository(format!(
                "symbolic ref must start with '{REF_PREFIX}', got '{ref_path}'"
            ))
        })?;

        Self::try_parse(name)
    }

    pub fn default_branch() -> Self {
        Self(DEFAULT_BRANCH.to_string())
    }

    /// `refs/heads/<name>`
    pub fn to_ref_path(&self) -> String {
        format!("{REF_PREFIX}{}", self.0)
    }

    /// Location of the ref file relative to the heads directory
    pub fn to_path(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
