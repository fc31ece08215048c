//! Commit graph
//!
//! Builds commits on top of the object store and walks their parent links.
//! Loaded commits are cached for the lifetime of the repository handle;
//! commits are immutable, so entries never need invalidating.

use crate::areas::database::Database;
use crate::areas::refs::Refs;
use crate::artifacts::objects::commit::{Author, Commit, FileTable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::{debug, info};

pub type CommitCache = RefCell<HashMap<ObjectId, Commit>>;

/// A commit together with its ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitEntry {
    pub oid: ObjectId,
    pub commit: Commit,
}

#[derive(Debug)]
pub struct CommitGraph<'r> {
    database: &'r Database,
    refs: &'r Refs,
    cache: &'r CommitCache,
}

impl<'r> CommitGraph<'r> {
    pub fn new(database: &'r Database, refs: &'r Refs, cache: &'r CommitCache) -> Self {
        CommitGraph {
            database,
            refs,
            cache,
        }
    }

    /// Record a new commit on top of HEAD and advance the ref HEAD resolves to
    ///
    /// The new file table is the parent's table overlaid with `staged`,
    /// minus `removed`. Nothing is written when both are empty.
    pub fn create_commit(
        &self,
        message: &str,
        author: Author,
        staged: &FileTable,
        removed: &BTreeSet<PathBuf>,
    ) -> Result<ObjectId> {
        if staged.is_empty() && removed.is_empty() {
            return Err(Error::EmptyCommit);
        }

        let parent = self.refs.read_head()?;
        let mut files = match &parent {
            Some(parent_oid) => self.get_commit(parent_oid)?.files().clone(),
            None => FileTable::new(),
        };
        files.extend(staged.iter().map(|(path, oid)| (path.clone(), oid.clone())));
        files.retain(|path, _| !removed.contains(path));

        let commit = Commit::new(parent.into_iter().collect(), author, message.to_string(), files);
        let commit_id = self.database.store(&commit)?;

        // a failed ref update leaves an unreachable object behind, nothing else
        self.refs.update_head(&commit_id)?;
        info!(oid = %commit_id, files = commit.files().len(), "created commit");

        self.cache.borrow_mut().insert(commit_id.clone(), commit);

        Ok(commit_id)
    }

    pub fn get_commit(&self, oid: &ObjectId) -> Result<Commit> {
        if let Some(commit) = self.cache.borrow().get(oid) {
            return Ok(commit.clone());
        }

        let commit = self.database.parse_object_as_commit(oid).map_err(|e| {
            if e.is_not_found() {
                Error::not_found("commit", oid)
            } else {
                e
            }
        })?;
        debug!(oid = %oid, "loaded commit");
        self.cache.borrow_mut().insert(oid.clone(), commit.clone());

        Ok(commit)
    }

    /// The commit HEAD resolves to, `None` before the first commit
    pub fn get_head_commit(&self) -> Result<Option<Commit>> {
        self.refs
            .read_head()?
            .map(|oid| self.get_commit(&oid))
            .transpose()
    }

    /// First-parent chain from HEAD, newest first
    ///
    /// `max_count` of 0 walks all the way to the root.
    pub fn get_history(&self, max_count: usize) -> Result<Vec<CommitEntry>> {
        match self.refs.read_head()? {
            Some(head) => self.get_history_from(&head, max_count),
            None => Ok(vec![]),
        }
    }

    pub fn get_history_from(&self, start: &ObjectId, max_count: usize) -> Result<Vec<CommitEntry>> {
        let mut history = Vec::new();
        let mut next = Some(start.clone());

        while let Some(oid) = next {
            if max_count != 0 && history.len() == max_count {
                break;
            }

            let commit = self.get_commit(&oid)?;
            next = commit.parent().cloned();
            history.push(CommitEntry { oid, commit });
        }

        Ok(history)
    }

    /// HEAD's path to blob mapping, empty before the first commit
    pub fn head_file_table(&self) -> Result<FileTable> {
        Ok(self
            .get_head_commit()?
            .map(|commit| commit.files().clone())
            .unwrap_or_default())
    }

    /// Whether `ancestor` is on the first-parent chain of `descendant`
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> Result<bool> {
        let mut next = Some(descendant.clone());

        while let Some(oid) = next {
            if &oid == ancestor {
                return Ok(true);
            }
            next = self.get_commit(&oid)?.parent().cloned();
        }

        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::branch::branch_name::BranchName;
    use crate::artifacts::objects::hasher::{ObjectHasher, Sha256Hasher};
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct GraphFixture {
        _dir: TempDir,
        database: Database,
        refs: Refs,
        cache: CommitCache,
    }

    impl GraphFixture {
        fn graph(&self) -> CommitGraph<'_> {
            CommitGraph::new(&self.database, &self.refs, &self.cache)
        }

        fn commit(&self, message: &str, path: &str, content: &[u8]) -> ObjectId {
            let blob = self.database.put(content).unwrap();
            let staged = FileTable::from([(PathBuf::from(path), blob)]);

            self.graph()
                .create_commit(message, author(), &staged, &BTreeSet::new())
                .unwrap()
        }
    }

    fn author() -> Author {
        Author::new("Jane Doe".to_string(), "jane@example.com".to_string())
    }

    #[fixture]
    fn fixture() -> GraphFixture {
        let dir = TempDir::new().unwrap();
        let database = Database::new(dir.path().join("objects").into(), Box::new(Sha256Hasher));
        let refs = Refs::new(dir.path().into());
        refs.set_head_branch(&BranchName::default_branch()).unwrap();

        GraphFixture {
            _dir: dir,
            database,
            refs,
            cache: CommitCache::default(),
        }
    }

    #[rstest]
    fn first_commit_records_the_staged_table(fixture: GraphFixture) {
        let oid = fixture.commit("c1", "a.txt", b"x\n");

        let head = fixture.graph().get_head_commit().unwrap().unwrap();
        assert_eq!(fixture.refs.read_head().unwrap(), Some(oid));
        assert!(head.is_root());
        assert_eq!(
            head.file(&PathBuf::from("a.txt")),
            Some(&Sha256Hasher.hash(b"x\n"))
        );
    }

    #[rstest]
    fn later_commits_overlay_the_parent_table(fixture: GraphFixture) {
        let c1 = fixture.commit("c1", "a.txt", b"x\n");
        fixture.commit("c2", "b.txt", b"y\n");

        let head = fixture.graph().get_head_commit().unwrap().unwrap();

        assert_eq!(head.parent(), Some(&c1));
        assert_eq!(
            head.files().keys().collect::<Vec<_>>(),
            vec![&PathBuf::from("a.txt"), &PathBuf::from("b.txt")]
        );
    }

    #[rstest]
    fn removed_paths_leave_the_table(fixture: GraphFixture) {
        fixture.commit("c1", "a.txt", b"x\n");
        let blob = fixture.database.put(b"y\n").unwrap();

        fixture
            .graph()
            .create_commit(
                "c2",
                author(),
                &FileTable::from([(PathBuf::from("b.txt"), blob)]),
                &BTreeSet::from([PathBuf::from("a.txt")]),
            )
            .unwrap();

        let table = fixture.graph().head_file_table().unwrap();
        assert_eq!(table.keys().collect::<Vec<_>>(), vec![&PathBuf::from("b.txt")]);
    }

    #[rstest]
    fn removal_only_commits_are_recorded(fixture: GraphFixture) {
        fixture.commit("c1", "a.txt", b"x\n");
        let c2 = fixture.commit("c2", "b.txt", b"y\n");

        let c3 = fixture
            .graph()
            .create_commit("c3", author(), &FileTable::new(), &BTreeSet::from([PathBuf::from("a.txt")]))
            .unwrap();

        let head = fixture.graph().get_commit(&c3).unwrap();
        assert_eq!(head.parent(), Some(&c2));
        assert_eq!(head.files().keys().collect::<Vec<_>>(), vec![&PathBuf::from("b.txt")]);
    }

    #[rstest]
    fn empty_commits_write_nothing(fixture: GraphFixture) {
        let c1 = fixture.commit("c1", "a.txt", b"x\n");
        let objects_before = walkdir::WalkDir::new(fixture.database.objects_path())
            .into_iter()
            .count();

        let result = fixture.graph().create_commit(
            "empty",
            author(),
            &FileTable::new(),
            &BTreeSet::new(),
        );

        assert!(matches!(result, Err(Error::EmptyCommit)));
        assert_eq!(fixture.refs.read_head().unwrap(), Some(c1));
        assert_eq!(
            walkdir::WalkDir::new(fixture.database.objects_path())
                .into_iter()
                .count(),
            objects_before
        );
    }

    #[rstest]
    fn history_follows_first_parents_newest_first(fixture: GraphFixture) {
        let c1 = fixture.commit("c1", "a.txt", b"1\n");
        let c2 = fixture.commit("c2", "a.txt", b"2\n");
        let c3 = fixture.commit("c3", "a.txt", b"3\n");

        let full = fixture.graph().get_history(0).unwrap();
        let limited = fixture.graph().get_history(2).unwrap();

        assert_eq!(
            full.iter().map(|entry| entry.oid.clone()).collect::<Vec<_>>(),
            vec![c3.clone(), c2.clone(), c1]
        );
        assert_eq!(
            limited.iter().map(|entry| entry.oid.clone()).collect::<Vec<_>>(),
            vec![c3, c2]
        );
    }

    #[rstest]
    fn ancestry_walks_the_first_parent_chain(fixture: GraphFixture) {
        let c1 = fixture.commit("c1", "a.txt", b"1\n");
        let c2 = fixture.commit("c2", "a.txt", b"2\n");

        assert!(fixture.graph().is_ancestor(&c1, &c2).unwrap());
        assert!(!fixture.graph().is_ancestor(&c2, &c1).unwrap());
    }

    #[rstest]
    fn unknown_commits_are_not_found(fixture: GraphFixture) {
        let result = fixture.graph().get_commit(&Sha256Hasher.hash(b"nothing"));

        assert!(result.unwrap_err().is_not_found());
    }
}
