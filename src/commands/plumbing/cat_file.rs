use crate::areas::repository::Repository;
use crate::artifacts::branch::MIN_ABBREVIATED_ID_LENGTH;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, IoContext, Result};
use std::io::Write;

impl Repository {
    /// Print a stored object: commits in their display form, anything else raw
    pub fn cat_file(&self, object_id: &str) -> Result<ObjectId> {
        let object_id = self.find_object(object_id)?;

        let mut writer = self.writer();
        if let Ok(commit) = self.database().parse_object_as_commit(&object_id) {
            writeln!(writer, "commit {object_id}")
                .and_then(|_| write!(writer, "{}", commit.display()))
                .io_context(|| "unable to write object")?;
        } else {
            let content = self.database().get(&object_id)?;
            writer
                .write_all(&content)
                .io_context(|| "unable to write object")?;
        }

        Ok(object_id)
    }

    /// Full ID of the object named by `id` or by an unambiguous prefix of it
    fn find_object(&self, id: &str) -> Result<ObjectId> {
        if let Ok(object_id) = ObjectId::try_parse(id)
            && self.database().exists(&object_id)
        {
            return Ok(object_id);
        }
        if id.len() < MIN_ABBREVIATED_ID_LENGTH {
            return Err(Error::not_found("object", id));
        }

        let mut candidates = self.database().find_objects_by_prefix(id)?;
        match candidates.len() {
            0 => Err(Error::not_found("object", id)),
            1 => Ok(candidates.remove(0)),
            _ => Err(Error::AmbiguousRevision {
                prefix: id.to_string(),
                candidates: candidates.iter().map(ObjectId::to_short_oid).collect(),
            }),
        }
    }
}
