use crate::areas::METADATA_DIR;
use crate::areas::commit_graph::{CommitCache, CommitGraph};
use crate::areas::config::{Remotes, Settings};
use crate::areas::database::Database;
use crate::areas::identity::{EnvIdentity, IdentityProvider};
use crate::areas::index::Index;
use crate::areas::lock::RepositoryLock;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::commit::Author;
use crate::errors::{Error, IoContext, Result};
use std::cell::{RefCell, RefMut};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const OBJECTS_DIR: &str = "objects";
pub const CONFIG_DIR: &str = "config";
pub const INDEX_FILE: &str = "index";
pub const LOCK_FILE: &str = "lock";

pub struct Repository {
    path: Box<Path>,
    metadata_path: Box<Path>,
    writer: RefCell<Box<dyn Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    settings: Settings,
    commit_cache: CommitCache,
    identity: Option<Box<dyn IdentityProvider>>,
}

impl Repository {
    /// Build a handle over `path` without checking that a repository exists there
    ///
    /// Used by `init`; everything else goes through [`Repository::open`].
    pub fn new(path: &Path, writer: Box<dyn Write>) -> Result<Self> {
        if !path.exists() {
            std::fs::create_dir_all(path).io_path_context("unable to create directory", path)?;
        }
        let path = path
            .canonicalize()
            .io_path_context("unable to resolve path", path)?;
        let metadata_path = path.join(METADATA_DIR);
        let settings = Settings::load(&metadata_path.join(CONFIG_DIR))?;

        Ok(Self::assemble(path, metadata_path, writer, settings))
    }

    /// Open the repository whose working tree contains `path`
    ///
    /// Walks up from `path` until a directory holding the metadata directory is found.
    pub fn open(path: &Path, writer: Box<dyn Write>) -> Result<Self> {
        let start = path
            .canonicalize()
            .io_path_context("unable to resolve path", path)?;

        let root = start
            .ancestors()
            .find(|candidate| candidate.join(METADATA_DIR).join("HEAD").is_file())
            .ok_or_else(|| {
                Error::InvalidRepository(format!(
                    "no {METADATA_DIR} directory in {} or any parent",
                    start.display()
                ))
            })?;

        Self::new(root, writer)
    }

    fn assemble(
        path: PathBuf,
        metadata_path: PathBuf,
        writer: Box<dyn Write>,
        settings: Settings,
    ) -> Self {
        let index = Index::new(metadata_path.join(INDEX_FILE).into_boxed_path());
        let database = Database::new(
            metadata_path.join(OBJECTS_DIR).into_boxed_path(),
            settings.core.hash.hasher(),
        );
        let workspace = Workspace::new(path.clone().into_boxed_path(), settings.core.ignore.clone());
        let refs = Refs::new(metadata_path.clone().into_boxed_path());

        Repository {
            path: path.into_boxed_path(),
            metadata_path: metadata_path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
            settings,
            commit_cache: CommitCache::default(),
            identity: None,
        }
    }

    /// Replace the settings and rebuild the parts that depend on them
    pub(crate) fn apply_settings(&mut self, settings: Settings) {
        self.database = Database::new(
            self.metadata_path.join(OBJECTS_DIR).into_boxed_path(),
            settings.core.hash.hasher(),
        );
        self.workspace = Workspace::new(self.path.clone(), settings.core.ignore.clone());
        self.settings = settings;
    }

    /// Use a different author source for new commits
    pub fn with_identity(mut self, identity: Box<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    pub fn config_path(&self) -> PathBuf {
        self.metadata_path.join(CONFIG_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    /// Write one line of command output
    pub(crate) fn print(&self, line: impl std::fmt::Display) -> Result<()> {
        writeln!(self.writer(), "{line}").io_context(|| "unable to write output")
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Author for a new commit: the injected identity, else environment and settings
    pub fn author(&self) -> Result<Author> {
        match &self.identity {
            Some(identity) => identity.author(),
            None => EnvIdentity::new(self.settings.user.clone()).author(),
        }
    }

    pub fn commit_graph(&'_ self) -> CommitGraph<'_> {
        CommitGraph::new(&self.database, &self.refs, &self.commit_cache)
    }

    pub fn remotes(&self) -> Result<Remotes> {
        Remotes::load(&self.config_path())
    }

    /// Take the exclusive repository lock; released when the guard drops
    pub fn lock(&self) -> Result<RepositoryLock> {
        RepositoryLock::acquire(&self.metadata_path.join(LOCK_FILE))
    }

    /// Reload the index from disk and rescan the working tree against HEAD
    pub fn refresh_index(&'_ self) -> Result<RefMut<'_, Index>> {
        let head = self.commit_graph().head_file_table()?;

        let mut index = self.index();
        index.rehydrate()?;
        index.update_status(&self.workspace, &self.database, &head)?;

        Ok(index)
    }

    /// Repository-relative form of a user-supplied path
    ///
    /// Relative paths are taken relative to the working-tree root. The result
    /// never escapes the working tree.
    pub fn relative_path(&self, path: &Path) -> Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.path.join(path)
        };

        let mut normalized = PathBuf::new();
        for component in absolute.components() {
            match component {
                std::path::Component::ParentDir => {
                    normalized.pop();
                }
                std::path::Component::CurDir => {}
                other => normalized.push(other),
            }
        }

        // the working-tree root is canonical, so resolve symlinks on the
        // longest existing prefix as well
        let resolved = normalized
            .ancestors()
            .find_map(|ancestor| {
                let canonical = ancestor.canonicalize().ok()?;
                let rest = normalized.strip_prefix(ancestor).ok()?;
                Some(canonical.join(rest))
            })
            .unwrap_or_else(|| normalized.clone());

        match resolved.strip_prefix(&self.path) {
            Ok(relative) if relative.as_os_str().is_empty() => Err(Error::InvalidState(format!(
                "{} is the repository root, not a file",
                path.display()
            ))),
            Ok(relative) => Ok(relative.to_path_buf()),
            Err(_) => Err(Error::InvalidState(format!(
                "{} is outside of the repository at {}",
                path.display(),
                self.path.display()
            ))),
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
