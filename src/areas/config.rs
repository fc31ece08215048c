//! Repository configuration
//!
//! `config/settings.toml` holds the repository settings:
//!
//! ```toml
//! [core]
//! hash = "sha256"
//! ignore = ["target", ".env"]
//!
//! [user]
//! name = "Jane Doe"
//! email = "jane@example.com"
//! ```
//!
//! `config/remotes` lists one `<name> <url>` pair per line.

use crate::artifacts::objects::hasher::HashAlgorithm;
use crate::errors::{Error, IoContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.toml";
pub const REMOTES_FILE: &str = "remotes";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub core: CoreSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreSettings {
    /// Hash function of the object store, fixed at init
    #[serde(default)]
    pub hash: HashAlgorithm,
    /// Paths left out of working-tree scans, matched exactly or as a prefix
    #[serde(default)]
    pub ignore: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub name: String,
    pub email: String,
}

impl Settings {
    pub fn with_hash(hash: HashAlgorithm) -> Self {
        Settings {
            core: CoreSettings {
                hash,
                ..Default::default()
            },
            user: None,
        }
    }

    /// Load settings from the config directory; a missing file means defaults
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(SETTINGS_FILE);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => return Err(e).io_path_context("unable to read settings", &path),
        };

        toml::from_str(&content)
            .map_err(|e| Error::InvalidRepository(format!("invalid {}: {e}", path.display())))
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        let path = config_dir.join(SETTINGS_FILE);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::InvalidState(format!("unable to serialize settings: {e}")))?;

        std::fs::create_dir_all(config_dir)
            .io_path_context("unable to create config directory", config_dir)?;
        std::fs::write(&path, content).io_path_context("unable to write settings", &path)
    }
}

/// Named remote URLs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remotes {
    remotes: BTreeMap<String, String>,
}

impl Remotes {
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(REMOTES_FILE);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Remotes::default()),
            Err(e) => return Err(e).io_path_context("unable to read remotes", &path),
        };

        let remotes = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.split_once(char::is_whitespace)
                    .map(|(name, url)| (name.to_string(), url.trim().to_string()))
                    .ok_or_else(|| {
                        Error::InvalidRepository(format!("malformed remote line {line:?}"))
                    })
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Remotes { remotes })
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        let path = config_dir.join(REMOTES_FILE);
        let content = self
            .remotes
            .iter()
            .map(|(name, url)| format!("{name} {url}\n"))
            .collect::<String>();

        std::fs::write(&path, content).io_path_context("unable to write remotes", &path)
    }

    pub fn add(&mut self, name: &str, url: &str) -> Result<()> {
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(Error::InvalidState(format!("invalid remote name {name:?}")));
        }
        if self.remotes.contains_key(name) {
            return Err(Error::InvalidState(format!("remote {name} already exists")));
        }

        self.remotes.insert(name.to_string(), url.to_string());
        Ok(())
    }

    pub fn url(&self, name: &str) -> Result<&str> {
        self.remotes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::not_found("remote", name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.remotes
            .iter()
            .map(|(name, url)| (name.as_str(), url.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();

        let settings = Settings::load(dir.path()).unwrap();

        assert_eq!(settings.core.hash, HashAlgorithm::Sha256);
        assert!(settings.core.ignore.is_empty());
        assert_eq!(settings.user, None);
    }

    #[test]
    fn reads_a_hand_written_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "[core]\nhash = \"sha1\"\nignore = [\"target\"]\n\n[user]\nname = \"Jane\"\nemail = \"jane@example.com\"\n",
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();

        assert_eq!(settings.core.hash, HashAlgorithm::Sha1);
        assert_eq!(settings.core.ignore, vec![PathBuf::from("target")]);
        assert_eq!(settings.user.unwrap().name, "Jane");
    }

    #[test]
    fn rejects_unknown_hash_functions() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), "[core]\nhash = \"md5\"\n").unwrap();

        assert!(matches!(
            Settings::load(dir.path()),
            Err(Error::InvalidRepository(_))
        ));
    }

    #[test]
    fn remotes_survive_a_save() {
        let dir = TempDir::new().unwrap();
        let mut remotes = Remotes::default();
        remotes.add("origin", "file:///srv/repo").unwrap();
        remotes.save(dir.path()).unwrap();

        let loaded = Remotes::load(dir.path()).unwrap();

        assert_eq!(loaded.url("origin").unwrap(), "file:///srv/repo");
        assert!(loaded.url("upstream").unwrap_err().is_not_found());
    }

    #[test]
    fn duplicate_remotes_are_rejected() {
        let mut remotes = Remotes::default();
        remotes.add("origin", "/a").unwrap();

        assert!(matches!(
            remotes.add("origin", "/b"),
            Err(Error::InvalidState(_))
        ));
    }
}
