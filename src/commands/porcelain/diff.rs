use crate::areas::repository::Repository;
use crate::artifacts::diff::diff_text;
use crate::artifacts::diff::format::write_colored;
use crate::artifacts::diff::patch::FileDiff;
use crate::errors::{IoContext, Result};
use std::path::Path;

impl Repository {
    /// Print the unified diff between two files
    ///
    /// Files inside the working tree are labelled by their repository-relative
    /// path, anything else by the path as given.
    pub fn diff(&self, old: &Path, new: &Path) -> Result<FileDiff> {
        let old_text = std::fs::read_to_string(old).io_path_context("unable to read", old)?;
        let new_text = std::fs::read_to_string(new).io_path_context("unable to read", new)?;

        let diff = diff_text(&self.diff_label(old), &self.diff_label(new), &old_text, &new_text);
        if !diff.is_empty() {
            write_colored(&diff, &mut **self.writer()).io_context(|| "unable to write diff")?;
        }

        Ok(diff)
    }

    fn diff_label(&self, path: &Path) -> String {
        self.relative_path(path)
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string()
    }
}
