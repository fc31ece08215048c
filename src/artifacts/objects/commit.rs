//! Commit object
//!
//! Commits are immutable snapshots of the repository. They contain:
//! - Parent commit ID(s) (for history)
//! - Author and committer information
//! - Commit message
//! - The file table: every tracked path mapped to its blob ID
//!
//! ## Format
//!
//! On disk (the commit ID is the hash of exactly these bytes):
//! ```text
//! parent <parent-id>
//! author <name> <<email>> <ISO-8601 UTC timestamp>
//! committer <name> <<email>> <ISO-8601 UTC timestamp>
//!
//! <commit message>
//!
//! files:
//! <path>\t<blob-id>
//! ```

use crate::artifacts::objects::object::{Object, Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Marker line opening the file table
const FILES_MARKER: &str = "files:";

/// Path to blob mapping recorded by a commit
pub type FileTable = BTreeMap<PathBuf, ObjectId>;

/// Author or committer information
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: DateTime<Utc>,
}

impl Author {
    /// Create a new author stamped with the current time
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: Utc::now(),
        }
    }

    pub fn new_with_timestamp(name: String, email: String, timestamp: DateTime<Utc>) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// "Name <email@example.com>"
    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// "Name <email> 2024-01-01T12:34:56Z"
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {}",
            self.name,
            self.email,
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }

    /// "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl TryFrom<&str> for Author {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        // Format: "name <email> timestamp"
        let (name_email_part, timestamp) = value
            .rsplit_once(' ')
            .ok_or_else(|| Error::InvalidObject(format!("invalid author line {value:?}")))?;

        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| Error::InvalidObject(format!("invalid timestamp {timestamp:?}: {e}")))?
            .with_timezone(&Utc);

        let email_start = name_email_part
            .find('<')
            .ok_or_else(|| Error::InvalidObject("invalid author format: missing '<'".into()))?;
        let email_end = name_email_part
            .rfind('>')
            .filter(|end| *end > email_start)
            .ok_or_else(|| Error::InvalidObject("invalid author format: missing '>'".into()))?;

        let name = name_email_part[..email_start].trim().to_string();
        let email = name_email_part[email_start + 1..email_end].to_string();

        Ok(Author {
            name,
            email,
            timestamp,
        })
    }
}

/// Commit object
///
/// Parents are ordered: the first parent is the one history walks follow.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    /// Parent commit IDs (empty for the root commit)
    parents: Vec<ObjectId>,
    author: Author,
    committer: Author,
    message: String,
    files: FileTable,
}

impl Commit {
    /// Create a new commit; the author doubles as committer
    pub fn new(parents: Vec<ObjectId>, author: Author, message: String, files: FileTable) -> Self {
        Commit {
            parents,
            author: author.clone(),
            committer: author,
            message,
            files,
        }
    }

    /// First line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn author(&self) -> &Author {
        &self.author
    }

    pub fn committer(&self) -> &Author {
        &self.committer
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.author.timestamp()
    }

    pub fn files(&self) -> &FileTable {
        &self.files
    }

    pub fn file(&self, path: &Path) -> Option<&ObjectId> {
        self.files.get(path)
    }

    fn render(&self) -> Result<String> {
        let mut lines = vec![];

        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("author {}", self.author.display()));
        lines.push(format!("committer {}", self.committer.display()));
        lines.push(String::new());
        lines.push(self.message.to_string());
        lines.push(String::new());
        lines.push(FILES_MARKER.to_string());
        for (path, oid) in &self.files {
            let path = path
                .to_str()
                .ok_or_else(|| Error::InvalidObject(format!("non UTF-8 path {path:?}")))?;
            lines.push(format!("{path}\t{oid}"));
        }

        let mut content = lines.join("\n");
        content.push('\n');
        Ok(content)
    }
}

impl Packable for Commit {
    fn serialize(&self) -> Result<Bytes> {
        Ok(Bytes::from(self.render()?))
    }
}

impl Unpackable for Commit {
    fn deserialize(bytes: Bytes) -> Result<Self> {
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| Error::InvalidObject("commit is not valid UTF-8".into()))?;

        let (header, body) = content
            .split_once("\n\n")
            .ok_or_else(|| Error::InvalidObject("commit is missing its header".into()))?;

        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in header.lines() {
            if let Some(parent_oid) = line.strip_prefix("parent ") {
                parents.push(ObjectId::try_parse(parent_oid)?);
            } else if let Some(value) = line.strip_prefix("author ") {
                author = Some(Author::try_from(value)?);
            } else if let Some(value) = line.strip_prefix("committer ") {
                committer = Some(Author::try_from(value)?);
            } else {
                return Err(Error::InvalidObject(format!(
                    "unexpected commit header line {line:?}"
                )));
            }
        }

        let author =
            author.ok_or_else(|| Error::InvalidObject("commit is missing its author".into()))?;
        let committer = committer
            .ok_or_else(|| Error::InvalidObject("commit is missing its committer".into()))?;

        // the message may itself contain blank lines, the file table is always last
        let body = format!("\n\n{body}");
        let marker = format!("\n\n{FILES_MARKER}\n");
        let marker_start = body
            .rfind(&marker)
            .ok_or_else(|| Error::InvalidObject("commit is missing its file table".into()))?;

        let message = body[2..marker_start.max(2)].to_string();
        let files = body[marker_start + marker.len()..]
            .lines()
            .map(|line| {
                let (path, oid) = line.split_once('\t').ok_or_else(|| {
                    Error::InvalidObject(format!("invalid file table line {line:?}"))
                })?;
                Ok((PathBuf::from(path), ObjectId::try_parse(oid)?))
            })
            .collect::<Result<FileTable>>()?;

        Ok(Commit {
            parents,
            author,
            committer,
            message,
            files,
        })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.render()
            .unwrap_or_else(|_| format!("{}\n", self.message))
    }
}
