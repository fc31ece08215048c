use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use colored::Colorize;

impl Repository {
    /// Print every branch, marking the checked-out one
    pub fn list_branches(&self) -> Result<Vec<BranchName>> {
        let current = self.refs().current_branch()?;
        let branches = self.refs().list_branches()?;

        for branch_name in &branches {
            if current.as_ref() == Some(branch_name) {
                self.print(format!("* {}", branch_name.as_ref().green()))?;
            } else {
                self.print(format!("  {branch_name}"))?;
            }
        }

        Ok(branches)
    }

    /// Create a branch at `source` (any revision), or at HEAD
    pub fn branch(&self, branch_name: &str, source: Option<&str>) -> Result<ObjectId> {
        let _lock = self.lock()?;
        let branch_name = BranchName::try_parse(branch_name)?;

        let source_oid = match source {
            Some(source) => Revision::try_parse(source)?.resolve(self)?,
            None => self.refs().read_head()?.ok_or_else(|| {
                Error::InvalidState(format!(
                    "cannot create branch {branch_name}: no commits yet"
                ))
            })?,
        };

        self.refs().create_branch(&branch_name, &source_oid)?;

        Ok(source_oid)
    }

    pub fn delete_branch(&self, branch_name: &str) -> Result<ObjectId> {
        let _lock = self.lock()?;
        let branch_name = BranchName::try_parse(branch_name)?;

        let oid = self.refs().delete_branch(&branch_name)?;
        self.print(format!(
            "Deleted branch {branch_name} (was {}).",
            oid.to_short_oid()
        ))?;

        Ok(oid)
    }
}
