use crate::areas::repository::Repository;
use crate::errors::Result;
use std::path::PathBuf;

impl Repository {
    /// Take paths out of the staging area, keeping their working-tree content
    pub fn unstage(&self, paths: &[PathBuf]) -> Result<()> {
        let _lock = self.lock()?;
        let mut index = self.refresh_index()?;

        for path in paths {
            let relative = self.relative_path(path)?;
            index.unstage_file(&relative)?;
        }

        index.write_updates()
    }
}
