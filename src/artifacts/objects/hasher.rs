//! Hash functions used for object identity
//!
//! The object store never hashes on its own: it is handed an [`ObjectHasher`]
//! at construction time. The algorithm is chosen once, at `init`, and recorded
//! in the repository settings.

use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use sha1::Digest;

/// Deterministic content hash producing a fixed-length hex digest
pub trait ObjectHasher: std::fmt::Debug {
    fn algorithm(&self) -> HashAlgorithm;

    fn hash(&self, data: &[u8]) -> ObjectId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha1,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha1 => "sha1",
        }
    }

    pub fn hasher(&self) -> Box<dyn ObjectHasher> {
        match self {
            HashAlgorithm::Sha256 => Box::new(Sha256Hasher),
            HashAlgorithm::Sha1 => Box::new(Sha1Hasher),
        }
    }
}

impl TryFrom<&str> for HashAlgorithm {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha1" => Ok(HashAlgorithm::Sha1),
            other => Err(Error::InvalidRepository(format!(
                "unknown hash algorithm {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl ObjectHasher for Sha256Hasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha256
    }

    fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = sha2::Sha256::new();
        hasher.update(data);

        ObjectId::from_digest(&hasher.finalize())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha1Hasher;

impl ObjectHasher for Sha1Hasher {
    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Sha1
    }

    fn hash(&self, data: &[u8]) -> ObjectId {
        let mut hasher = sha1::Sha1::new();
        hasher.update(data);

        ObjectId::from_digest(&hasher.finalize())
    }
}
