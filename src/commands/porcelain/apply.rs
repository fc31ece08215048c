use crate::areas::repository::Repository;
use crate::artifacts::diff::apply_patch_to_text;
use crate::artifacts::diff::patch::FileDiff;
use crate::errors::{Error, IoContext, Result};
use std::path::{Path, PathBuf};
use tracing::info;

impl Repository {
    /// Replay a patch file onto the working tree
    ///
    /// The target is the patch's `+++` path, relative to the working-tree root;
    /// a missing target is treated as empty. The file is only rewritten when
    /// every hunk applies.
    pub fn apply(&self, patch: &Path) -> Result<PathBuf> {
        let _lock = self.lock()?;

        let text = std::fs::read_to_string(patch).io_path_context("unable to read patch", patch)?;
        let diff = FileDiff::parse(&text)?;
        let target = self.relative_path(Path::new(&diff.new_path))?;

        let current = match self.workspace().read_file(&target) {
            Ok(content) => String::from_utf8(content.to_vec()).map_err(|_| {
                Error::InvalidState(format!("{} is not a text file", target.display()))
            })?,
            Err(e) if e.is_not_found() => String::new(),
            Err(e) => return Err(e),
        };

        let patched = apply_patch_to_text(&diff, &current)?;
        self.workspace().write_file(&target, patched.as_bytes())?;

        info!(path = %target.display(), hunks = diff.hunks.len(), "applied patch");
        self.print(format!("Applied patch to {}", target.display()))?;

        Ok(target)
    }
}
