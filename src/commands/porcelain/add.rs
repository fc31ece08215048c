use crate::areas::repository::Repository;
use crate::errors::{Error, Result};
use std::path::{Path, PathBuf};

impl Repository {
    /// Stage files; a directory stages every file below it
    pub fn add(&self, paths: &[PathBuf]) -> Result<()> {
        let _lock = self.lock()?;
        let mut index = self.refresh_index()?;

        let mut files = Vec::new();
        for path in paths {
            let relative = match self.relative_path(path) {
                Ok(relative) => relative,
                Err(_) if self.is_root(path) => PathBuf::new(),
                Err(e) => return Err(e),
            };
            files.extend(self.expand_path(&relative)?);
        }

        for file in &files {
            index.stage_file(file, self.workspace(), self.database())?;
        }

        index.write_updates()
    }

    fn is_root(&self, path: &Path) -> bool {
        let absolute = self.path().join(path);
        absolute
            .canonicalize()
            .is_ok_and(|canonical| canonical == self.path())
    }

    /// Files of the working tree at or below `path`
    pub(crate) fn expand_path(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !self.workspace().path().join(path).is_dir() {
            return Ok(vec![path.to_path_buf()]);
        }

        let files = self
            .workspace()
            .list_files()?
            .into_iter()
            .filter(|file| file.starts_with(path))
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(Error::not_found("file", path.display()));
        }

        Ok(files)
    }
}
