//! Git-backed version store.
//!
//! Reads commits, trees and blobs straight from the object database with
//! `gix`. Nothing is checked out; the working tree is never touched.

use std::path::Path;

use gix::{
    ObjectId, ThreadSafeRepository,
    bstr::ByteSlice,
    objs::tree::EntryKind,
    revision::spec::parse::{Error as SpecError, single::Error as SingleError},
};

use super::{Entry, Pagination, StoreError, TreeEntry, VersionStore, path_changed};
use crate::debug;

/// Version store over a git repository.
#[derive(Clone)]
pub struct GitStore {
    repo: ThreadSafeRepository,
}

impl GitStore {
    /// Open an existing git repository
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let repo = gix::open(root).map_err(StoreError::backend)?;
        debug!("store"; "opened {}", root.display());
        Ok(Self::from_repo(repo.into_sync()))
    }

    /// Wrap an already opened repository.
    pub fn from_repo(repo: ThreadSafeRepository) -> Self {
        Self { repo }
    }

    /// Underlying repository handle.
    pub fn repo(&self) -> &ThreadSafeRepository {
        &self.repo
    }

    fn local(&self) -> gix::Repository {
        self.repo.to_thread_local()
    }
}

impl VersionStore for GitStore {
    type Commit = ObjectId;
    type Tree = ObjectId;
    type Blob = ObjectId;

    /// Accepts anything `git rev-parse` does; annotated tags are peeled.
    ///
    /// Specs that name nothing are [`StoreError::VersionNotFound`]; failures
    /// reading refs or objects are [`StoreError::Backend`].
    fn resolve_commit(&self, version: &str) -> Result<ObjectId, StoreError> {
        let repo = self.local();
        let not_found = || StoreError::VersionNotFound(version.to_owned());

        let id = repo.rev_parse_single(version).map_err(|err| {
            let unresolved = match &err {
                SingleError::RangedRev { .. } => true,
                SingleError::Parse(parse) => is_unresolved(parse),
            };
            if unresolved {
                not_found()
            } else {
                StoreError::backend(err)
            }
        })?;
        let commit = id
            .object()
            .map_err(StoreError::backend)?
            .peel_to_kind(gix::object::Kind::Commit)
            .map_err(|err| match err {
                gix::object::peel::to_kind::Error::NotFound { .. } => not_found(),
                other => StoreError::backend(other),
            })?;

        Ok(commit.id)
    }

    fn tree_of(&self, commit: &ObjectId) -> Result<ObjectId, StoreError> {
        let repo = self.local();
        let commit = repo.find_commit(*commit).map_err(StoreError::backend)?;
        let tree_id = commit.tree_id().map_err(StoreError::backend)?;
        Ok(tree_id.detach())
    }

    /// Entries in git tree order.
    ///
    /// Submodules and symlinks are skipped, and so are names that are not
    /// valid UTF-8, since paths built from them could not be looked up again.
    fn children_of(&self, tree: &ObjectId) -> Result<Vec<Entry<Self>>, StoreError> {
        let repo = self.local();
        let tree = repo.find_tree(*tree).map_err(StoreError::backend)?;
        let decoded = tree.decode().map_err(StoreError::backend)?;

        let entries = decoded
            .entries
            .iter()
            .filter_map(|entry| {
                let Ok(name) = entry.filename.to_str() else {
                    debug!("store"; "skipping non-UTF-8 entry {:?}", entry.filename);
                    return None;
                };
                let name = name.to_owned();
                let id = entry.oid.to_owned();
                match entry.mode.kind() {
                    EntryKind::Tree => Some(TreeEntry::Tree { name, id }),
                    EntryKind::Blob | EntryKind::BlobExecutable => {
                        Some(TreeEntry::Blob { name, id })
                    }
                    EntryKind::Link | EntryKind::Commit => None,
                }
            })
            .collect();

        Ok(entries)
    }

    fn data_of(&self, blob: &ObjectId) -> Result<Vec<u8>, StoreError> {
        let repo = self.local();
        let blob = repo.find_blob(*blob).map_err(StoreError::backend)?;
        Ok(blob.data.clone())
    }

    /// Walks all ancestors and keeps commits whose blob at `path` differs
    /// from their first parent's.
    fn log_of(
        &self,
        commit: &ObjectId,
        path: &str,
        pagination: Pagination,
    ) -> Result<Vec<ObjectId>, StoreError> {
        pagination.validate()?;

        let repo = self.local();
        let walk = repo
            .rev_walk([*commit])
            .all()
            .map_err(StoreError::backend)?;

        let mut skipped = 0;
        let mut page = Vec::with_capacity(pagination.limit());

        for info in walk {
            let info = info.map_err(StoreError::backend)?;
            let tree = self.tree_of(&info.id)?;
            let parent_tree = match info.parent_ids.first() {
                Some(parent) => Some(self.tree_of(parent)?),
                None => None,
            };

            if !path_changed(self, &tree, parent_tree.as_ref(), path)? {
                continue;
            }
            if skipped < pagination.skip() {
                skipped += 1;
                continue;
            }
            page.push(info.id);
            if page.len() == pagination.limit() {
                break;
            }
        }

        debug!("store"; "{} commit(s) touch {}", page.len(), path);
        Ok(page)
    }
}

/// Whether a failed rev-parse means the spec names no object, as opposed
/// to a failure reading refs or the object database.
fn is_unresolved(err: &SpecError) -> bool {
    use gix::objs::find::existing::Error as FindObject;
    use gix::refs::file::find::existing::Error as FindRef;

    match err {
        SpecError::FindReference(FindRef::NotFound { .. })
        | SpecError::FindObject(FindObject::NotFound { .. })
        | SpecError::Parse(_)
        | SpecError::Malformed
        | SpecError::IdFromHex(_)
        | SpecError::PrefixNotFound { .. }
        | SpecError::AmbiguousPrefix { .. }
        | SpecError::AmbiguousRefAndObject { .. }
        | SpecError::PeelToId { .. }
        | SpecError::ObjectKind { .. }
        | SpecError::PathNotFound { .. }
        | SpecError::AncestorOutOfRange { .. }
        | SpecError::ParentOutOfRange { .. }
        | SpecError::NoRegexMatch { .. }
        | SpecError::NoRegexMatchAllRefs { .. }
        | SpecError::UnbornHeadsHaveNoRefLog
        | SpecError::EmptyReflog
        | SpecError::SingleNotFound => true,
        SpecError::Multi { current, next } => {
            let unresolved = |e: &(dyn std::error::Error + Send + Sync + 'static)| {
                e.downcast_ref::<SpecError>().is_some_and(is_unresolved)
            };
            unresolved(current.as_ref()) && next.as_deref().is_none_or(unresolved)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gix::{bstr::BString, objs::Tree, objs::tree};
    use std::fs;
    use tempfile::TempDir;

    /// Fresh repository with a committer identity in its local config.
    fn make_repo() -> (TempDir, gix::Repository) {
        let temp = TempDir::new().unwrap();
        let repo = gix::init(temp.path()).unwrap();
        let config = repo.path().join("config");
        let mut content = fs::read_to_string(&config).unwrap();
        content.push_str("[user]\n\tname = Wiki Test\n\temail = wiki@example.com\n");
        fs::write(&config, content).unwrap();

        let repo = gix::open(temp.path()).unwrap();
        (temp, repo)
    }

    fn write_tree(repo: &gix::Repository, files: &[(&str, &str)]) -> ObjectId {
        let mut entries = Vec::new();
        let mut dirs: Vec<(&str, Vec<(&str, &str)>)> = Vec::new();

        for &(path, content) in files {
            match path.split_once('/') {
                Some((dir, rest)) => match dirs.iter_mut().find(|(d, _)| *d == dir) {
                    Some((_, children)) => children.push((rest, content)),
                    None => dirs.push((dir, vec![(rest, content)])),
                },
                None => {
                    let oid = repo.write_blob(content.as_bytes()).unwrap().detach();
                    entries.push(tree::Entry {
                        mode: tree::EntryKind::Blob.into(),
                        oid,
                        filename: BString::from(path),
                    });
                }
            }
        }
        for (dir, children) in dirs {
            let oid = write_tree(repo, &children);
            entries.push(tree::Entry {
                mode: tree::EntryKind::Tree.into(),
                oid,
                filename: BString::from(dir),
            });
        }

        let tree_mode: tree::EntryMode = tree::EntryKind::Tree.into();
        entries.sort_by(|a, b| {
            let sort_key = |e: &tree::Entry| {
                let mut key = e.filename.to_vec();
                if e.mode == tree_mode {
                    key.push(b'/');
                }
                key
            };
            sort_key(a).cmp(&sort_key(b))
        });

        repo.write_object(&Tree { entries }).unwrap().detach()
    }

    fn commit(repo: &gix::Repository, files: &[(&str, &str)], message: &str) -> ObjectId {
        let tree = write_tree(repo, files);
        let parents: Vec<ObjectId> = repo
            .head_id()
            .ok()
            .map(|id| vec![id.detach()])
            .unwrap_or_default();
        repo.commit("HEAD", message, tree, parents).unwrap().detach()
    }

    #[test]
    fn test_resolve_and_read() {
        let (temp, repo) = make_repo();
        let c1 = commit(&repo, &[("Home.md", "# Home"), ("docs/Guide.md", "guide")], "init");

        let store = GitStore::open(temp.path()).unwrap();
        assert_eq!(store.resolve_commit("HEAD").unwrap(), c1);
        assert_eq!(store.resolve_commit(&c1.to_string()).unwrap(), c1);
        assert!(matches!(
            store.resolve_commit("no-such-branch"),
            Err(StoreError::VersionNotFound(_))
        ));

        let root = store.tree_of(&c1).unwrap();
        let children = store.children_of(&root).unwrap();
        let names: Vec<_> = children.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["Home.md", "docs"]);
        assert!(children[1].is_tree());

        let Some(TreeEntry::Blob { id, .. }) = store.entry_at(&root, "docs/Guide.md").unwrap()
        else {
            panic!("expected blob at docs/Guide.md");
        };
        assert_eq!(store.data_of(&id).unwrap(), b"guide");
    }

    #[test]
    fn test_resolve_commit_read_failure_is_not_version_not_found() {
        let (temp, repo) = make_repo();
        commit(&repo, &[("Home.md", "# Home")], "init");
        fs::write(repo.path().join("refs/heads/broken"), "not a ref\n").unwrap();

        let store = GitStore::open(temp.path()).unwrap();
        assert!(matches!(
            store.resolve_commit("broken"),
            Err(StoreError::Backend(_))
        ));
        assert!(matches!(
            store.resolve_commit("deadbeef"),
            Err(StoreError::VersionNotFound(_))
        ));
    }

    #[test]
    fn test_children_skip_non_utf8_names() {
        let (temp, repo) = make_repo();
        let blob = repo.write_blob(b"x").unwrap().detach();
        let mut entries = vec![
            tree::Entry {
                mode: tree::EntryKind::Blob.into(),
                oid: blob,
                filename: BString::from("Home.md"),
            },
            tree::Entry {
                mode: tree::EntryKind::Blob.into(),
                oid: blob,
                filename: BString::from(vec![0xff, b'.', b'm', b'd']),
            },
        ];
        entries.sort_by(|a, b| a.filename.cmp(&b.filename));
        let root = repo.write_object(&Tree { entries }).unwrap().detach();

        let store = GitStore::open(temp.path()).unwrap();
        let names: Vec<_> = store
            .children_of(&root)
            .unwrap()
            .iter()
            .map(|e| e.name().to_owned())
            .collect();
        assert_eq!(names, ["Home.md"]);
    }

    #[test]
    fn test_log_of_follows_path() {
        let (temp, repo) = make_repo();
        let c1 = commit(&repo, &[("Home.md", "v1"), ("Other.md", "a")], "c1");
        let _c2 = commit(&repo, &[("Home.md", "v1"), ("Other.md", "b")], "c2");
        let c3 = commit(&repo, &[("Home.md", "v2"), ("Other.md", "b")], "c3");

        let store = GitStore::open(temp.path()).unwrap();
        let history = store.log_of(&c3, "Home.md", Pagination::default()).unwrap();
        assert_eq!(history, [c3, c1]);

        let paged = store
            .log_of(&c3, "Home.md", Pagination::new(2, 1).unwrap())
            .unwrap();
        assert_eq!(paged, [c1]);
    }
}
