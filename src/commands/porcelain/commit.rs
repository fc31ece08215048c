use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;

impl Repository {
    pub fn commit(&self, message: &str) -> Result<ObjectId> {
        let _lock = self.lock()?;
        let mut index = self.refresh_index()?;

        let staged = index.staged_table();
        let removed = index.removed_paths();
        let author = self.author()?;

        let graph = self.commit_graph();
        let commit_id = graph.create_commit(message.trim(), author, &staged, &removed)?;
        let commit = graph.get_commit(&commit_id)?;

        index.mark_committed(commit.files());
        index.write_updates()?;
        drop(index);

        let branch = match self.refs().current_branch()? {
            Some(branch_name) => branch_name.to_string(),
            None => "detached HEAD".to_string(),
        };
        let is_root = if commit.is_root() { "(root-commit) " } else { "" };

        self.print(format!(
            "[{branch} {is_root}{}] {}",
            commit_id.to_short_oid(),
            commit.short_message()
        ))?;

        Ok(commit_id)
    }
}
