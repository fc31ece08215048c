use crate::areas::repository::Repository;
use crate::errors::Result;
use std::path::PathBuf;

impl Repository {
    /// Stop tracking paths, deleting committed files from the working tree
    ///
    /// The next commit drops them from its file table.
    pub fn rm(&self, paths: &[PathBuf]) -> Result<()> {
        let _lock = self.lock()?;
        let mut index = self.refresh_index()?;

        for path in paths {
            let relative = self.relative_path(path)?;
            index.remove_file(&relative, self.workspace())?;
            self.print(format!("rm '{}'", relative.display()))?;
        }

        index.write_updates()
    }
}
