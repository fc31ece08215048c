use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use tracing::info;

const DETACHMENT_NOTICE: &str = r#"
You are in 'detached HEAD' state. You can look around and make experimental
commits; they are not kept on any branch unless you create one with:

    mim branch <new-branch-name>
"#;

impl Repository {
    /// Switch to a branch, or detach HEAD at any other revision
    pub fn checkout(&self, target: &str) -> Result<ObjectId> {
        let _lock = self.lock()?;
        let previous_head = self.refs().head()?;

        let target_branch = BranchName::try_parse(target)
            .ok()
            .filter(|branch_name| self.refs().branch_exists(branch_name));
        let target_oid = match &target_branch {
            Some(branch_name) => self
                .refs()
                .read_ref(branch_name)?
                .ok_or_else(|| Error::not_found("branch tip", branch_name))?,
            None => Revision::try_parse(target)?.resolve(self)?,
        };

        self.migrate_to(&target_oid)?;

        match &target_branch {
            Some(branch_name) => self.refs().set_head_branch(branch_name)?,
            None => self.refs().set_head_detached(&target_oid)?,
        }
        info!(target, oid = %target_oid, "checked out");

        match (&previous_head, &target_branch) {
            (Head::Branch(previous), Some(branch_name)) if previous == branch_name => {
                self.print(format!("Already on '{branch_name}'"))?;
            }
            (_, Some(branch_name)) => {
                self.print(format!("Switched to branch '{branch_name}'"))?;
            }
            (head, None) => {
                if matches!(head, Head::Branch(_)) {
                    self.print(format!("Note: checking out '{target}'.\n{DETACHMENT_NOTICE}"))?;
                }
                let commit = self.commit_graph().get_commit(&target_oid)?;
                self.print(format!(
                    "HEAD is now at {} {}",
                    target_oid.to_short_oid(),
                    commit.short_message()
                ))?;
            }
        }

        Ok(target_oid)
    }

    /// Rewrite the working tree and the index from HEAD's commit to `target_oid`
    ///
    /// Refs are left alone. Fails without touching anything when a blob is
    /// missing or a local change would be overwritten. The caller holds the lock.
    pub(crate) fn migrate_to(&self, target_oid: &ObjectId) -> Result<()> {
        let graph = self.commit_graph();
        let current = graph.head_file_table()?;
        let target = graph.get_commit(target_oid)?.files().clone();

        let mut index = self.refresh_index()?;
        let mut migration = Migration::new(self, &mut index, &current, &target);
        migration.apply_changes()?;
        let changes = migration.actions().values().map(Vec::len).sum::<usize>();

        index.write_updates()?;
        info!(oid = %target_oid, changes, "updated working tree");

        Ok(())
    }
}
