//! Object identifier (hex digest)
//!
//! Object IDs are lowercase hexadecimal digests produced by the repository's
//! hash function: 64 characters for SHA-256, 40 for SHA-1.
//!
//! ## Storage
//!
//! Objects are stored in `.mim/objects/<first-2-chars>/<remaining-chars>`

use crate::artifacts::objects::{SHA1_HEX_LENGTH, SHA256_HEX_LENGTH, SHORT_ID_LENGTH};
use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Length of the directory shard taken from the front of an object ID
pub const SHARD_LENGTH: usize = 2;

/// Object identifier
///
/// A validated hexadecimal digest that uniquely identifies a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Accepts full-length SHA-256 or SHA-1 digests; uppercase input is normalized.
    pub fn try_parse(id: impl AsRef<str>) -> Result<Self> {
        let id = id.as_ref().trim();

        if id.len() != SHA256_HEX_LENGTH && id.len() != SHA1_HEX_LENGTH {
            return Err(Error::InvalidObject(format!(
                "invalid object id length {}: {id:?}",
                id.len()
            )));
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObject(format!(
                "invalid object id characters: {id:?}"
            )));
        }

        Ok(Self(id.to_ascii_lowercase()))
    }

    /// Build an object ID from raw digest bytes
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(
            digest
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<String>(),
        )
    }

    /// Convert to the sharded storage path
    ///
    /// `abc123...` becomes `ab/c123...`
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(SHARD_LENGTH);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the digest
    pub fn to_short_oid(&self) -> String {
        self.0[..SHORT_ID_LENGTH].to_string()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
