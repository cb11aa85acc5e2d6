//! Version store contract consumed by the resolver.
//!
//! A store exposes commits, trees and blobs by opaque handle. The resolver
//! never looks inside a handle; it only asks the store to expand trees and
//! read blobs.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── error.rs    # StoreError
//! ├── git.rs      # GitStore (gix)
//! ├── memory.rs   # MemoryStore (in-process arena)
//! └── mod.rs      # VersionStore, TreeEntry, Pagination (this file)
//! ```

mod error;
pub mod git;
pub mod memory;

pub use error::StoreError;
pub use git::GitStore;
pub use memory::MemoryStore;

use std::fmt;

// ============================================================================
// Tree entries
// ============================================================================

/// One named child of a tree, as exposed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEntry<T, B> {
    /// A file.
    Blob { name: String, id: B },
    /// A directory.
    Tree { name: String, id: T },
}

impl<T, B> TreeEntry<T, B> {
    /// Entry name within its parent tree.
    pub fn name(&self) -> &str {
        match self {
            Self::Blob { name, .. } | Self::Tree { name, .. } => name,
        }
    }

    #[inline]
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree { .. })
    }
}

/// Tree entry type for a given store.
pub type Entry<S> = TreeEntry<<S as VersionStore>::Tree, <S as VersionStore>::Blob>;

// ============================================================================
// Pagination
// ============================================================================

/// Page window over a commit history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    /// Commits per page, at least 1.
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 30,
        }
    }
}

impl Pagination {
    /// Create a checked page window.
    pub fn new(page: u32, per_page: u32) -> Result<Self, StoreError> {
        let pagination = Self { page, per_page };
        pagination.validate()?;
        Ok(pagination)
    }

    /// Reject page 0 and empty pages.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.page == 0 || self.per_page == 0 {
            return Err(StoreError::InvalidPagination {
                page: self.page,
                per_page: self.per_page,
            });
        }
        Ok(())
    }

    /// Number of matching commits to skip before this page starts.
    #[inline]
    pub fn skip(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.per_page as usize)
    }

    /// Maximum number of commits on this page.
    #[inline]
    pub fn limit(&self) -> usize {
        self.per_page as usize
    }
}

// ============================================================================
// VersionStore
// ============================================================================

/// Read access to a versioned, content-addressed tree store.
///
/// Handles are cheap to clone and stable for the duration of a call.
/// Every read may perform I/O; failures surface as [`StoreError`] and are
/// never retried by callers in this crate.
pub trait VersionStore {
    /// Commit handle.
    type Commit: Clone + PartialEq + fmt::Debug;
    /// Tree (directory) handle.
    type Tree: Clone + fmt::Debug;
    /// Blob (file content) handle.
    type Blob: Clone + PartialEq + fmt::Debug;

    /// Resolve a version identifier to a commit.
    ///
    /// Fails with [`StoreError::VersionNotFound`] for unknown identifiers.
    fn resolve_commit(&self, version: &str) -> Result<Self::Commit, StoreError>;

    /// Root tree of a commit.
    fn tree_of(&self, commit: &Self::Commit) -> Result<Self::Tree, StoreError>;

    /// Children of a tree, in store order.
    fn children_of(&self, tree: &Self::Tree) -> Result<Vec<Entry<Self>>, StoreError>;

    /// Content of a blob.
    fn data_of(&self, blob: &Self::Blob) -> Result<Vec<u8>, StoreError>;

    /// Commits reachable from `commit` that changed `path`, newest first.
    fn log_of(
        &self,
        commit: &Self::Commit,
        path: &str,
        pagination: Pagination,
    ) -> Result<Vec<Self::Commit>, StoreError>;

    /// Entry at a slash-separated `path` below `root`.
    ///
    /// An empty path has no entry; callers use `root` directly.
    fn entry_at(&self, root: &Self::Tree, path: &str) -> Result<Option<Entry<Self>>, StoreError> {
        let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();
        let mut tree = root.clone();

        while let Some(segment) = segments.next() {
            let Some(entry) = self
                .children_of(&tree)?
                .into_iter()
                .find(|e| e.name() == segment)
            else {
                return Ok(None);
            };

            if segments.peek().is_none() {
                return Ok(Some(entry));
            }
            match entry {
                TreeEntry::Tree { id, .. } => tree = id,
                TreeEntry::Blob { .. } => return Ok(None),
            }
        }

        Ok(None)
    }

    /// Subtree at `path`, or `root` itself for an empty path.
    fn tree_at(&self, root: &Self::Tree, path: &str) -> Result<Option<Self::Tree>, StoreError> {
        if path.split('/').all(str::is_empty) {
            return Ok(Some(root.clone()));
        }
        match self.entry_at(root, path)? {
            Some(TreeEntry::Tree { id, .. }) => Ok(Some(id)),
            _ => Ok(None),
        }
    }
}

/// Check whether the blob at `path` differs between two trees.
///
/// A missing `parent` counts as an empty tree, so a root commit touches
/// every path it contains.
pub(crate) fn path_changed<S: VersionStore + ?Sized>(
    store: &S,
    tree: &S::Tree,
    parent: Option<&S::Tree>,
    path: &str,
) -> Result<bool, StoreError> {
    let current = blob_at(store, tree, path)?;
    let previous = match parent {
        Some(parent) => blob_at(store, parent, path)?,
        None => None,
    };
    Ok(current.is_some() && current != previous)
}

fn blob_at<S: VersionStore + ?Sized>(
    store: &S,
    tree: &S::Tree,
    path: &str,
) -> Result<Option<S::Blob>, StoreError> {
    match store.entry_at(tree, path)? {
        Some(TreeEntry::Blob { id, .. }) => Ok(Some(id)),
        _ => Ok(None),
    }
}
