use crate::artifacts::objects::hasher::ObjectHasher;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;
use std::path::PathBuf;

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(bytes: Bytes) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object: Packable {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// Identity of the object: the hash of exactly the bytes that get stored
    fn object_id(&self, hasher: &dyn ObjectHasher) -> Result<ObjectId> {
        let content = self.serialize()?;
        Ok(hasher.hash(&content))
    }

    fn object_path(&self, hasher: &dyn ObjectHasher) -> Result<PathBuf> {
        Ok(self.object_id(hasher)?.to_path())
    }
}
