//! In-process version store.
//!
//! Objects live in append-only arenas and are addressed by index, so
//! handles are `Copy` and stay valid for the lifetime of the store.
//! Blobs are deduplicated by content.
//! Trees built from path lists follow git tree ordering.

use std::fmt;

use rustc_hash::FxHashMap;

use super::{Entry, Pagination, StoreError, TreeEntry, VersionStore, path_changed};

/// Blob handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobId(usize);

/// Tree handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(usize);

/// Commit handle.
///
/// Displays as a zero-padded 40 digit hex id, which `resolve_commit`
/// accepts back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitId(usize);

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:040x}", self.0 + 1)
    }
}

#[derive(Debug, Clone)]
struct CommitRecord {
    tree: TreeId,
    parent: Option<CommitId>,
    message: String,
}

/// Version store backed by in-memory arenas.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Vec<Vec<u8>>,
    blob_index: FxHashMap<Vec<u8>, BlobId>,
    trees: Vec<Vec<TreeEntry<TreeId, BlobId>>>,
    commits: Vec<CommitRecord>,
    refs: FxHashMap<String, CommitId>,
    head: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a blob. Identical content shares one handle.
    pub fn insert_blob(&mut self, data: impl Into<Vec<u8>>) -> BlobId {
        let data = data.into();
        if let Some(id) = self.blob_index.get(&data) {
            return *id;
        }
        let id = BlobId(self.blobs.len());
        self.blobs.push(data.clone());
        self.blob_index.insert(data, id);
        id
    }

    /// Store a tree with entries in exactly the given order.
    pub fn insert_tree(&mut self, entries: Vec<TreeEntry<TreeId, BlobId>>) -> TreeId {
        self.trees.push(entries);
        TreeId(self.trees.len() - 1)
    }

    /// Build nested trees from `(path, content)` pairs.
    ///
    /// Later duplicates replace earlier ones. Each level is sorted the way
    /// git sorts tree entries.
    pub fn write_tree<P, D>(&mut self, files: impl IntoIterator<Item = (P, D)>) -> TreeId
    where
        P: AsRef<str>,
        D: Into<Vec<u8>>,
    {
        let mut root = PendingDir::default();
        for (path, data) in files {
            let segments: Vec<&str> = path
                .as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .collect();
            root.insert(&segments, data.into());
        }
        self.write_pending(root)
    }

    fn write_pending(&mut self, dir: PendingDir) -> TreeId {
        let mut entries = Vec::with_capacity(dir.entries.len());
        for (name, node) in dir.entries {
            let entry = match node {
                PendingNode::File(data) => TreeEntry::Blob {
                    name,
                    id: self.insert_blob(data),
                },
                PendingNode::Dir(sub) => TreeEntry::Tree {
                    name,
                    id: self.write_pending(sub),
                },
            };
            entries.push(entry);
        }
        sort_tree_entries(&mut entries);
        self.insert_tree(entries)
    }

    /// Record a commit of `tree`.
    pub fn commit(
        &mut self,
        tree: TreeId,
        parent: Option<CommitId>,
        message: impl Into<String>,
    ) -> CommitId {
        self.commits.push(CommitRecord {
            tree,
            parent,
            message: message.into(),
        });
        CommitId(self.commits.len() - 1)
    }

    /// Point a named ref at a commit. The first ref set becomes `HEAD`.
    pub fn set_ref(&mut self, name: impl Into<String>, commit: CommitId) {
        let name = name.into();
        if self.head.is_none() {
            self.head = Some(name.clone());
        }
        self.refs.insert(name, commit);
    }

    /// Commit a full snapshot of `files` on top of `refname` and advance it.
    pub fn commit_files<P, D>(
        &mut self,
        refname: &str,
        files: impl IntoIterator<Item = (P, D)>,
        message: &str,
    ) -> CommitId
    where
        P: AsRef<str>,
        D: Into<Vec<u8>>,
    {
        let tree = self.write_tree(files);
        let parent = self.refs.get(refname).copied();
        let commit = self.commit(tree, parent, message);
        self.set_ref(refname, commit);
        commit
    }

    /// Commit message, for display.
    pub fn message(&self, commit: CommitId) -> Option<&str> {
        self.commits.get(commit.0).map(|c| c.message.as_str())
    }

    fn record(&self, commit: CommitId) -> Result<&CommitRecord, StoreError> {
        self.commits
            .get(commit.0)
            .ok_or_else(|| StoreError::MissingObject(commit.to_string()))
    }

    fn parse_commit_id(&self, version: &str) -> Option<CommitId> {
        if version.len() != 40 {
            return None;
        }
        let raw = usize::from_str_radix(version, 16).ok()?;
        let index = raw.checked_sub(1)?;
        (index < self.commits.len()).then_some(CommitId(index))
    }
}

impl VersionStore for MemoryStore {
    type Commit = CommitId;
    type Tree = TreeId;
    type Blob = BlobId;

    fn resolve_commit(&self, version: &str) -> Result<CommitId, StoreError> {
        let name = match (version, &self.head) {
            ("HEAD", Some(head)) => head.as_str(),
            _ => version,
        };
        self.refs
            .get(name)
            .copied()
            .or_else(|| self.parse_commit_id(version))
            .ok_or_else(|| StoreError::VersionNotFound(version.to_owned()))
    }

    fn tree_of(&self, commit: &CommitId) -> Result<TreeId, StoreError> {
        Ok(self.record(*commit)?.tree)
    }

    fn children_of(&self, tree: &TreeId) -> Result<Vec<Entry<Self>>, StoreError> {
        self.trees
            .get(tree.0)
            .cloned()
            .ok_or_else(|| StoreError::MissingObject(format!("tree {}", tree.0)))
    }

    fn data_of(&self, blob: &BlobId) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .get(blob.0)
            .cloned()
            .ok_or_else(|| StoreError::MissingObject(format!("blob {}", blob.0)))
    }

    fn log_of(
        &self,
        commit: &CommitId,
        path: &str,
        pagination: Pagination,
    ) -> Result<Vec<CommitId>, StoreError> {
        pagination.validate()?;

        let mut skipped = 0;
        let mut page = Vec::with_capacity(pagination.limit());
        let mut cursor = Some(*commit);

        while let Some(id) = cursor {
            let record = self.record(id)?;
            let parent_tree = match record.parent {
                Some(parent) => Some(self.tree_of(&parent)?),
                None => None,
            };

            if path_changed(self, &record.tree, parent_tree.as_ref(), path)? {
                if skipped < pagination.skip() {
                    skipped += 1;
                } else {
                    page.push(id);
                    if page.len() == pagination.limit() {
                        break;
                    }
                }
            }
            cursor = record.parent;
        }

        Ok(page)
    }
}

// ============================================================================
// Tree building
// ============================================================================

#[derive(Default)]
struct PendingDir {
    entries: Vec<(String, PendingNode)>,
}

enum PendingNode {
    File(Vec<u8>),
    Dir(PendingDir),
}

impl PendingDir {
    fn insert(&mut self, segments: &[&str], data: Vec<u8>) {
        let Some((first, rest)) = segments.split_first() else {
            return;
        };
        let position = self.entries.iter().position(|(name, _)| name == first);

        if rest.is_empty() {
            let node = PendingNode::File(data);
            match position {
                Some(i) => self.entries[i].1 = node,
                None => self.entries.push(((*first).to_owned(), node)),
            }
            return;
        }

        let index = match position {
            Some(i) if matches!(self.entries[i].1, PendingNode::Dir(_)) => i,
            Some(i) => {
                self.entries[i].1 = PendingNode::Dir(PendingDir::default());
                i
            }
            None => {
                self.entries.push((
                    (*first).to_owned(),
                    PendingNode::Dir(PendingDir::default()),
                ));
                self.entries.len() - 1
            }
        };

        if let PendingNode::Dir(dir) = &mut self.entries[index].1 {
            dir.insert(rest, data);
        }
    }
}

/// Sort entries according to git tree ordering (directories get trailing slash for comparison)
///
/// This ensures that "foo" (file) comes before "foo-bar" (file), but "foo-bar" comes before "foo" (directory).
fn sort_tree_entries<T, B>(entries: &mut [TreeEntry<T, B>]) {
    entries.sort_by(|a, b| {
        let sort_key = |e: &TreeEntry<T, B>| {
            let mut key = e.name().as_bytes().to_vec();
            if e.is_tree() {
                key.push(b'/');
            }
            key
        };
        sort_key(a).cmp(&sort_key(b))
    });
}
