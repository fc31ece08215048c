use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{IoContext, Result};
use std::path::Path;

impl Repository {
    /// Print the blob ID of a file, storing the blob when `write` is set
    pub fn hash_object(&self, path: &Path, write: bool) -> Result<ObjectId> {
        let content = std::fs::read(path).io_path_context("unable to read", path)?;
        let blob = Blob::new(content.into());

        let object_id = if write {
            let _lock = self.lock()?;
            self.database().store(&blob)?
        } else {
            blob.object_id(self.database().hasher())?
        };

        self.print(&object_id)?;

        Ok(object_id)
    }
}
