use crate::areas::refs::HEAD_REF_NAME;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::{ANCESTOR_REGEX, MIN_ABBREVIATED_ID_LENGTH, PARENT_REGEX};
use crate::artifacts::objects::SHA256_HEX_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

const HEAD_ALIAS: &str = "@";

static PARENT_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(PARENT_REGEX));
static ANCESTOR_PATTERN: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(ANCESTOR_REGEX));

/// A command-line revision argument
///
/// Accepted forms:
/// - branch names (`master`, `feature/x`), `HEAD` and its alias `@`
/// - full or abbreviated (at least 4 hex characters) commit IDs
/// - `<revision>^` for the parent and `<revision>~<n>` for the n-th first-parent ancestor
///
/// Hex strings parse as `Ref` and are only tried as object IDs when no branch
/// of that name exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    Ref(BranchName),
    Parent(Box<Revision>),
    Ancestor(Box<Revision>, usize),
}

impl Revision {
    pub fn try_parse(revision: &str) -> Result<Revision> {
        let parent = PARENT_PATTERN
            .as_ref()
            .map_err(|e| Error::InvalidState(format!("invalid parent regex: {e}")))?;
        let ancestor = ANCESTOR_PATTERN
            .as_ref()
            .map_err(|e| Error::InvalidState(format!("invalid ancestor regex: {e}")))?;

        if let Some(caps) = parent.captures(revision) {
            return Ok(Revision::Parent(Box::new(Self::try_parse(&caps[1])?)));
        }

        if let Some(caps) = ancestor.captures(revision) {
            let generations = caps[2].parse::<usize>().map_err(|e| {
                Error::InvalidState(format!("invalid ancestor count in {revision:?}: {e}"))
            })?;
            return Ok(Revision::Ancestor(
                Box::new(Self::try_parse(&caps[1])?),
                generations,
            ));
        }

        let name = if revision == HEAD_ALIAS { HEAD_REF_NAME } else { revision };
        Ok(Revision::Ref(BranchName::try_parse(name)?))
    }

    /// The commit this revision names
    pub fn resolve(&self, repository: &Repository) -> Result<ObjectId> {
        match self {
            Revision::Ref(name) => Self::resolve_name(name, repository),
            Revision::Parent(base) => {
                let oid = base.resolve(repository)?;
                Self::parent_of(&oid, self, repository)
            }
            Revision::Ancestor(base, generations) => {
                let mut oid = base.resolve(repository)?;
                for _ in 0..*generations {
                    oid = Self::parent_of(&oid, self, repository)?;
                }

                Ok(oid)
            }
        }
    }

    fn resolve_name(name: &BranchName, repository: &Repository) -> Result<ObjectId> {
        let refs = repository.refs();

        if name.as_ref() == HEAD_REF_NAME {
            return refs
                .read_head()?
                .ok_or_else(|| Error::not_found("revision", "HEAD (no commits yet)"));
        }

        if refs.branch_exists(name) {
            return refs
                .read_ref(name)?
                .ok_or_else(|| Error::not_found("branch tip", name));
        }

        if Self::looks_like_oid(name.as_ref()) {
            return Self::resolve_oid(name.as_ref(), repository);
        }

        Err(Error::not_found("branch", name))
    }

    fn resolve_oid(prefix: &str, repository: &Repository) -> Result<ObjectId> {
        let database = repository.database();

        let candidates = database
            .find_objects_by_prefix(prefix)?
            .into_iter()
            .filter(|oid| database.is_commit(oid))
            .collect::<Vec<_>>();

        match candidates.as_slice() {
            [] => Err(Error::not_found("revision", prefix)),
            [oid] => Ok(oid.clone()),
            _ => Err(Error::AmbiguousRevision {
                prefix: prefix.to_string(),
                candidates: candidates.iter().map(ObjectId::to_short_oid).collect(),
            }),
        }
    }

    fn parent_of(oid: &ObjectId, revision: &Revision, repository: &Repository) -> Result<ObjectId> {
        repository
            .commit_graph()
            .get_commit(oid)?
            .parent()
            .cloned()
            .ok_or_else(|| Error::not_found("revision", revision))
    }

    fn looks_like_oid(name: &str) -> bool {
        (MIN_ABBREVIATED_ID_LENGTH..=SHA256_HEX_LENGTH).contains(&name.len())
            && name.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl std::fmt::Display for Revision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Revision::Ref(name) => write!(f, "{name}"),
            Revision::Parent(base) => write!(f, "{base}^"),
            Revision::Ancestor(base, generations) => write!(f, "{base}~{generations}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::areas::identity::StaticIdentity;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};
    use std::path::PathBuf;

    fn branch(name: &str) -> Revision {
        Revision::Ref(BranchName::try_parse(name).unwrap())
    }

    #[rstest]
    #[case("master", branch("master"))]
    #[case("@", branch("HEAD"))]
    #[case("master^", Revision::Parent(Box::new(branch("master"))))]
    #[case("HEAD^^", Revision::Parent(Box::new(Revision::Parent(Box::new(branch("HEAD"))))))]
    #[case("a1b2~3", Revision::Ancestor(Box::new(branch("a1b2")), 3))]
    #[case("feature/x~0", Revision::Ancestor(Box::new(branch("feature/x")), 0))]
    fn parses_revisions(#[case] input: &str, #[case] expected: Revision) {
        assert_eq!(Revision::try_parse(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case(".hidden^")]
    #[case("bad name")]
    #[case("x..y~2")]
    fn rejects_invalid_bases(#[case] input: &str) {
        assert!(matches!(
            Revision::try_parse(input),
            Err(Error::InvalidBranchName(_))
        ));
    }

    struct RepoFixture {
        _dir: TempDir,
        repository: Repository,
    }

    impl RepoFixture {
        fn commit(&self, content: &str) -> ObjectId {
            std::fs::write(self.repository.path().join("a.txt"), content).unwrap();
            self.repository.add(&[PathBuf::from("a.txt")]).unwrap();
            self.repository.commit(content.trim()).unwrap()
        }
    }

    #[fixture]
    fn repo() -> RepoFixture {
        let dir = TempDir::new().unwrap();
        let mut repository = Repository::new(dir.path(), Box::new(std::io::sink()))
            .unwrap()
            .with_identity(Box::new(StaticIdentity::new(
                "Jane Doe".to_string(),
                "jane@example.com".to_string(),
            )));
        repository.init(Default::default()).unwrap();

        RepoFixture {
            _dir: dir,
            repository,
        }
    }

    #[rstest]
    fn resolves_branches_ancestors_and_prefixes(repo: RepoFixture) {
        let c1 = repo.commit("one\n");
        let c2 = repo.commit("two\n");
        let c3 = repo.commit("three\n");
        let resolve = |input: &str| {
            Revision::try_parse(input)
                .unwrap()
                .resolve(&repo.repository)
                .unwrap()
        };

        assert_eq!(resolve("master"), c3);
        assert_eq!(resolve("@^"), c2);
        assert_eq!(resolve("HEAD~2"), c1);
        assert_eq!(resolve(&c2.as_ref()[..8]), c2);
        assert_eq!(resolve(c1.as_ref()), c1);
    }

    #[rstest]
    fn walking_past_the_root_is_not_found(repo: RepoFixture) {
        repo.commit("one\n");

        let result = Revision::try_parse("master~1")
            .unwrap()
            .resolve(&repo.repository);

        assert!(result.unwrap_err().is_not_found());
    }

    #[rstest]
    fn blobs_are_not_revisions(repo: RepoFixture) {
        repo.commit("one\n");
        let blob = repo.repository.database().hasher().hash(b"one\n");

        let result = Revision::try_parse(blob.as_ref())
            .unwrap()
            .resolve(&repo.repository);

        assert!(result.unwrap_err().is_not_found());
    }

    proptest! {
        #[test]
        fn hex_prefixes_parse_as_refs(prefix in "[0-9a-f]{4,64}") {
            prop_assert_eq!(
                Revision::try_parse(&prefix).unwrap(),
                Revision::Ref(BranchName::try_parse(prefix.clone()).unwrap())
            );
        }

        #[test]
        fn display_inverts_parsing(name in "[a-z][a-z0-9]{0,8}", generations in 0usize..20) {
            let input = format!("{name}~{generations}^");

            prop_assert_eq!(Revision::try_parse(&input).unwrap().to_string(), input);
        }
    }
}
