use crate::areas::METADATA_DIR;
use crate::errors::{Error, IoContext, Result};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// The working tree
///
/// All paths handed in and out are relative to the working-tree root.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
    /// Relative paths excluded from scans, matched exactly or as a prefix
    ignore: Vec<PathBuf>,
}

impl Workspace {
    pub fn new(path: Box<Path>, ignore: Vec<PathBuf>) -> Self {
        Workspace { path, ignore }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every regular file under the root, sorted, minus the metadata directory and ignored paths
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.path)
            .min_depth(1)
            .into_iter()
            .filter_entry(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.path)
                    .map(|relative| !self.is_ignored(relative))
                    .unwrap_or(false)
            });

        for entry in walker {
            let entry = entry.map_err(|e| Error::Io {
                context: format!("unable to scan {}", self.path.display()),
                source: e.into(),
            })?;

            if entry.file_type().is_file()
                && let Ok(relative) = entry.path().strip_prefix(&self.path)
            {
                files.push(relative.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }

    /// Whether a relative path is the metadata directory or covered by the ignore list
    pub fn is_ignored(&self, path: &Path) -> bool {
        let in_metadata_dir = matches!(
            path.components().next(),
            Some(Component::Normal(name)) if name == METADATA_DIR
        );

        in_metadata_dir || self.ignore.iter().any(|ignored| path.starts_with(ignored))
    }

    pub fn exists(&self, file_path: &Path) -> bool {
        self.path.join(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &Path) -> Result<Bytes> {
        let full_path = self.path.join(file_path);

        match std::fs::read(&full_path) {
            Ok(content) => Ok(content.into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found("file", file_path.display()))
            }
            Err(e) => Err(e).io_path_context("unable to read file", &full_path),
        }
    }

    /// Write a file, creating parent directories and replacing a directory in its way
    pub fn write_file(&self, file_path: &Path, content: &[u8]) -> Result<()> {
        let full_path = self.path.join(file_path);

        if full_path.is_dir() {
            std::fs::remove_dir_all(&full_path)
                .io_path_context("unable to remove existing directory", &full_path)?;
        }
        if let Some(parent) = full_path.parent() {
            self.make_directory(parent)?;
        }

        std::fs::write(&full_path, content).io_path_context("unable to write file", &full_path)
    }

    /// Delete a file and prune the directories it leaves empty
    pub fn remove_file(&self, file_path: &Path) -> Result<()> {
        let full_path = self.path.join(file_path);

        match std::fs::remove_file(&full_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).io_path_context("unable to remove file", &full_path),
        }

        self.prune_empty_parent_dirs(&full_path)
    }

    fn make_directory(&self, dir_path: &Path) -> Result<()> {
        // a file where a directory is needed gets replaced
        for ancestor in dir_path.ancestors() {
            if ancestor == self.path.as_ref() {
                break;
            }
            if ancestor.is_file() {
                std::fs::remove_file(ancestor)
                    .io_path_context("unable to remove file in the way", ancestor)?;
            }
        }

        std::fs::create_dir_all(dir_path).io_path_context("unable to create directory", dir_path)
    }

    fn prune_empty_parent_dirs(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && parent != self.path.as_ref()
            && parent.is_dir()
            && parent
                .read_dir()
                .io_path_context("unable to list directory", parent)?
                .next()
                .is_none()
        {
            std::fs::remove_dir(parent)
                .io_path_context("unable to remove empty directory", parent)?;
            self.prune_empty_parent_dirs(parent)?;
        }

        Ok(())
    }
}
