//! Content-addressable object store
//!
//! Every object lives in `objects/<first-2-chars>/<remaining-chars>` and its file
//! holds exactly the bytes that were hashed. Objects are immutable: a store of
//! content that already exists is a no-op.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::hasher::ObjectHasher;
use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_id::{ObjectId, SHARD_LENGTH};
use crate::errors::{Error, IoContext, Result};
use bytes::Bytes;
use fake::rand;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    hasher: Box<dyn ObjectHasher>,
}

// TODO: pack loose objects once repositories grow past a few thousand objects
impl Database {
    pub fn new(path: Box<Path>, hasher: Box<dyn ObjectHasher>) -> Self {
        Database { path, hasher }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    pub fn hasher(&self) -> &dyn ObjectHasher {
        self.hasher.as_ref()
    }

    /// Store raw bytes and return their ID
    ///
    /// Storing the same bytes twice yields the same ID and writes nothing new.
    pub fn put(&self, content: &[u8]) -> Result<ObjectId> {
        let object_id = self.hasher.hash(content);
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            debug!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::InvalidObject(format!("invalid object path {object_path:?}")))?;
        std::fs::create_dir_all(object_dir)
            .io_path_context("unable to create object directory", object_dir)?;

        self.write_object(&object_path, content)?;
        debug!(oid = %object_id, size = content.len(), "stored object");

        Ok(object_id)
    }

    /// Read the bytes stored under `object_id`
    pub fn get(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        match std::fs::read(&object_path) {
            Ok(content) => Ok(content.into()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found("object", object_id))
            }
            Err(e) => Err(e).io_path_context("unable to read object file", &object_path),
        }
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Serialize and store a typed object
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let content = object.serialize()?;

        self.put(&content)
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        Blob::deserialize(self.get(object_id)?)
    }

    /// Load a commit; fails with `InvalidObject` when the object is not one
    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        let content = self.get(object_id)?;

        Commit::deserialize(content)
            .map_err(|_| Error::InvalidObject(format!("object {object_id} is not a commit")))
    }

    pub fn is_commit(&self, object_id: &ObjectId) -> bool {
        self.parse_object_as_commit(object_id).is_ok()
    }

    fn write_object(&self, object_path: &Path, content: &[u8]) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::InvalidObject(format!("invalid object path {object_path:?}")))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .io_path_context("unable to open object file", &temp_object_path)?;

        file.write_all(content)
            .io_path_context("unable to write object file", &temp_object_path)?;
        file.sync_all()
            .io_path_context("unable to flush object file", &temp_object_path)?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, object_path)
            .io_path_context("unable to rename object file to", object_path)
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose ID starts with the given prefix
    ///
    /// Used to resolve abbreviated IDs; more than one match means the prefix
    /// is ambiguous. Prefixes of two or more characters only look inside
    /// their shard directory.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();

        let shard_dirs: Vec<PathBuf> = if prefix.len() >= SHARD_LENGTH {
            vec![self.path.join(&prefix[..SHARD_LENGTH])]
        } else {
            (0..=u8::MAX)
                .map(|shard| self.path.join(format!("{shard:02x}")))
                .collect()
        };

        let mut matches = Vec::new();
        for shard_dir in shard_dirs.iter().filter(|dir| dir.is_dir()) {
            let shard = shard_dir
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();

            for entry in std::fs::read_dir(shard_dir)
                .io_path_context("unable to list object directory", shard_dir)?
            {
                let entry = entry.io_path_context("unable to list object directory", shard_dir)?;
                let full_id = format!("{shard}{}", entry.file_name().to_string_lossy());

                if full_id.starts_with(&prefix)
                    && let Ok(object_id) = ObjectId::try_parse(&full_id)
                {
                    matches.push(object_id);
                }
            }
        }

        matches.sort();
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::hasher::Sha256Hasher;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn objects_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn database(dir: &TempDir) -> Database {
        Database::new(dir.path().into(), Box::new(Sha256Hasher))
    }

    #[rstest]
    fn stores_content_under_its_sharded_hash(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let oid = database.put(b"x\n").unwrap();

        let (shard, rest) = oid.as_ref().split_at(2);
        assert_eq!(
            std::fs::read(objects_dir.path().join(shard).join(rest)).unwrap(),
            b"x\n"
        );
        assert!(database.exists(&oid));
    }

    #[rstest]
    fn storing_twice_keeps_a_single_copy(objects_dir: TempDir) {
        let database = database(&objects_dir);

        let first = database.put(b"same").unwrap();
        let second = database.put(b"same").unwrap();

        assert_eq!(first, second);
        let shard_dir = objects_dir.path().join(&first.as_ref()[..2]);
        assert_eq!(std::fs::read_dir(shard_dir).unwrap().count(), 1);
    }

    #[rstest]
    fn missing_objects_are_not_found(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = Sha256Hasher.hash(b"never stored");

        assert!(!database.exists(&oid));
        assert!(database.get(&oid).unwrap_err().is_not_found());
    }

    #[rstest]
    fn blobs_are_not_commits(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put(b"plain text\n").unwrap();

        assert!(matches!(
            database.parse_object_as_commit(&oid),
            Err(Error::InvalidObject(_))
        ));
    }

    #[rstest]
    fn finds_objects_by_abbreviated_id(objects_dir: TempDir) {
        let database = database(&objects_dir);
        let oid = database.put(b"findable").unwrap();
        database.put(b"something else").unwrap();

        let matches = database
            .find_objects_by_prefix(&oid.as_ref()[..6])
            .unwrap();

        assert_eq!(matches, vec![oid]);
    }

    proptest! {
        #[test]
        fn get_returns_what_put_stored(payload in proptest::collection::vec(any::<u8>(), 0..512)) {
            let dir = TempDir::new().unwrap();
            let database = database(&dir);

            let oid = database.put(&payload).unwrap();

            prop_assert_eq!(database.get(&oid).unwrap().to_vec(), payload);
        }
    }
}
