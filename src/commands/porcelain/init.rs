use crate::areas::config::Settings;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::hasher::HashAlgorithm;
use crate::errors::{Error, IoContext, Result};
use std::fs;
use tracing::info;

impl Repository {
    /// Create the metadata directory with HEAD on the default branch
    ///
    /// The hash algorithm is recorded in the settings and cannot change later.
    pub fn init(&mut self, hash: HashAlgorithm) -> Result<()> {
        if self.refs().head_path().exists() {
            return Err(Error::InvalidState(format!(
                "{} is already a repository",
                self.path().display()
            )));
        }

        for dir in [
            self.metadata_path().join(crate::areas::repository::OBJECTS_DIR),
            self.refs().heads_path().to_path_buf(),
            self.config_path(),
        ] {
            fs::create_dir_all(&dir).io_path_context("unable to create directory", &dir)?;
        }

        let settings = Settings {
            user: self.settings().user.clone(),
            ..Settings::with_hash(hash)
        };
        settings.save(&self.config_path())?;
        self.apply_settings(settings);

        self.refs().set_head_branch(&BranchName::default_branch())?;
        info!(path = %self.path().display(), %hash, "initialized repository");

        self.print(format!(
            "Initialized empty mim repository in {}",
            self.metadata_path().display()
        ))
    }
}
