//! Page name resolution over a versioned tree.
//!
//! Trees are searched level by level. Every visited subtree is recorded in
//! a [`ParentMap`] together with the index of the subtree it was found in,
//! so once a page matches, its directory path is rebuilt by following
//! parent links back to the root. The map lives for one search only.

use std::collections::VecDeque;

use smallvec::SmallVec;

use crate::debug;
use crate::page::{PageHandle, matches_page};
use crate::store::{StoreError, TreeEntry, VersionStore};

// ============================================================================
// Parent map
// ============================================================================

/// Visited subtree: its handle, its name and where it was found.
#[derive(Debug)]
struct Visited<T> {
    tree: T,
    name: String,
    parent: Option<usize>,
}

/// Arena of visited subtrees linked to their parents by index.
///
/// Indices stay valid for the whole search, so nodes never need stable
/// identity in the store.
#[derive(Debug)]
pub(crate) struct ParentMap<T> {
    nodes: Vec<Visited<T>>,
}

impl<T> ParentMap<T> {
    /// Start a map whose root (index 0) sits at `base`.
    ///
    /// `base` is the root's own path; empty for a repository root.
    fn new(root: T, base: &str) -> Self {
        Self {
            nodes: vec![Visited {
                tree: root,
                name: base.trim_matches('/').to_owned(),
                parent: None,
            }],
        }
    }

    /// Record `tree`, found inside the node at `parent`.
    fn insert(&mut self, tree: T, name: String, parent: usize) -> usize {
        self.nodes.push(Visited {
            tree,
            name,
            parent: Some(parent),
        });
        self.nodes.len() - 1
    }

    fn tree(&self, index: usize) -> &T {
        &self.nodes[index].tree
    }

    /// Slash-joined path of the node at `index`, without a leading `/`.
    fn path_of(&self, index: usize) -> String {
        let mut segments: SmallVec<[&str; 8]> = SmallVec::new();
        let mut cursor = Some(index);

        while let Some(i) = cursor {
            let node = &self.nodes[i];
            if !node.name.is_empty() {
                segments.push(&node.name);
            }
            cursor = node.parent;
        }

        segments.reverse();
        segments.join("/")
    }

    /// Path of a file named `filename` inside the node at `index`.
    fn file_path(&self, index: usize, filename: &str) -> String {
        join_path(&self.path_of(index), filename)
    }
}

fn join_path(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Finds pages by human name in trees of a [`VersionStore`].
#[derive(Debug)]
pub struct Resolver<'s, S: VersionStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: VersionStore + ?Sized> Resolver<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Search `root` breadth-first for a page called `name`.
    ///
    /// Within a level, entries are visited in store order and the first
    /// match wins. The returned handle has no version bound. `Ok(None)`
    /// means no page matched; store read failures propagate.
    pub fn find(
        &self,
        root: &S::Tree,
        name: &str,
    ) -> Result<Option<PageHandle<'s, S>>, StoreError> {
        self.find_under(root, "", name)
    }

    /// Like [`find`](Self::find) for a subtree located at `base`.
    ///
    /// Returned paths include `base`, so they stay relative to the
    /// repository root.
    pub fn find_under(
        &self,
        root: &S::Tree,
        base: &str,
        name: &str,
    ) -> Result<Option<PageHandle<'s, S>>, StoreError> {
        let mut parents = ParentMap::new(root.clone(), base);
        let mut queue = VecDeque::from([0usize]);

        while let Some(index) = queue.pop_front() {
            for entry in self.store.children_of(parents.tree(index))? {
                match entry {
                    TreeEntry::Blob { name: filename, id } if matches_page(name, &filename) => {
                        let path = parents.file_path(index, &filename);
                        debug!("resolve"; "{} -> {}", name, path);
                        return Ok(Some(PageHandle::new(self.store, id, path)));
                    }
                    TreeEntry::Tree { name: dirname, id } => {
                        let child = parents.insert(id, dirname, index);
                        queue.push_back(child);
                    }
                    TreeEntry::Blob { .. } => {}
                }
            }
        }

        debug!("resolve"; "{} not found", name);
        Ok(None)
    }

    /// Find `name` directly inside `dir`, then in each ancestor of `dir`.
    ///
    /// Only the directories on that chain are scanned, never their
    /// subdirectories. Used for `_Footer` and `_Sidebar` lookups.
    pub fn find_nearest(
        &self,
        root: &S::Tree,
        dir: &str,
        name: &str,
    ) -> Result<Option<PageHandle<'s, S>>, StoreError> {
        let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();

        loop {
            let current = segments.join("/");
            if let Some(tree) = self.store.tree_at(root, &current)? {
                for entry in self.store.children_of(&tree)? {
                    if let TreeEntry::Blob { name: filename, id } = entry
                        && matches_page(name, &filename)
                    {
                        let path = join_path(&current, &filename);
                        debug!("resolve"; "{} -> {}", name, path);
                        return Ok(Some(PageHandle::new(self.store, id, path)));
                    }
                }
            }

            if segments.pop().is_none() {
                return Ok(None);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::store::memory::TreeId;

    fn find_path(store: &MemoryStore, root: TreeId, name: &str) -> Option<String> {
        Resolver::new(store)
            .find(&root, name)
            .unwrap()
            .map(|page| page.path().to_owned())
    }

    #[test]
    fn test_parent_map_path() {
        let mut map = ParentMap::new((), "");
        let docs = map.insert((), "docs".into(), 0);
        let guide = map.insert((), "guide".into(), docs);

        assert_eq!(map.path_of(0), "");
        assert_eq!(map.path_of(guide), "docs/guide");
        assert_eq!(map.file_path(0, "Home.md"), "Home.md");
        assert_eq!(map.file_path(guide, "Intro.md"), "docs/guide/Intro.md");

        let mut based = ParentMap::new((), "/wiki/");
        let sub = based.insert((), "sub".into(), 0);
        assert_eq!(based.file_path(sub, "A.md"), "wiki/sub/A.md");
    }

    #[test]
    fn test_find_in_subdirectory() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([("docs/Home.md", "# Home"), ("README", "readme")]);
        assert_eq!(find_path(&store, root, "Home").as_deref(), Some("docs/Home.md"));
    }

    #[test]
    fn test_find_prefers_shallower_match() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([
            ("a/b/Home.md", "deep"),
            ("z/Home.md", "shallow"),
        ]);
        assert_eq!(find_path(&store, root, "Home").as_deref(), Some("z/Home.md"));
    }

    #[test]
    fn test_find_root_before_subtrees() {
        let mut store = MemoryStore::new();
        let home = store.insert_blob("root");
        let nested = store.write_tree([("Home.md", "nested")]);
        // Subtree listed first: the root-level file still wins.
        let root = store.insert_tree(vec![
            TreeEntry::Tree { name: "aaa".into(), id: nested },
            TreeEntry::Blob { name: "Home.md".into(), id: home },
        ]);
        assert_eq!(find_path(&store, root, "Home").as_deref(), Some("Home.md"));
    }

    #[test]
    fn test_find_uses_store_order_within_level() {
        let mut store = MemoryStore::new();
        let org = store.insert_blob("* org");
        let md = store.insert_blob("# md");
        let root = store.insert_tree(vec![
            TreeEntry::Blob { name: "Home.org".into(), id: org },
            TreeEntry::Blob { name: "Home.md".into(), id: md },
        ]);
        assert_eq!(find_path(&store, root, "Home").as_deref(), Some("Home.org"));
    }

    #[test]
    fn test_find_canonical_names() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([
            ("people/Bilbo-Baggins.md", "hobbit"),
            ("people/Bilbo_Baggins.md", "other"),
        ]);
        assert_eq!(
            find_path(&store, root, "Bilbo Baggins").as_deref(),
            Some("people/Bilbo-Baggins.md")
        );
        assert_eq!(find_path(&store, root, "Frodo"), None);
    }

    #[test]
    fn test_find_matches_reserved_fragments() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([("docs/_Footer.md", "footer")]);
        assert_eq!(
            find_path(&store, root, "_Footer").as_deref(),
            Some("docs/_Footer.md")
        );
        assert_eq!(find_path(&store, root, "Footer"), None);
    }

    #[test]
    fn test_find_name_with_line_break() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([("notes/Line\nBreak.md", "x")]);
        let page = Resolver::new(&store)
            .find(&root, "Line\nBreak")
            .unwrap()
            .unwrap();
        assert_eq!(page.path(), "notes/Line\nBreak.md");
        assert_eq!(page.format(), Some(crate::page::Format::Markdown));
    }

    #[test]
    fn test_find_ignores_non_page_files_and_dirs() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([("Home.txt", "x"), ("Home/readme", "y")]);
        assert_eq!(find_path(&store, root, "Home"), None);
    }

    #[test]
    fn test_find_empty_tree() {
        let mut store = MemoryStore::new();
        let root = store.insert_tree(Vec::new());
        assert_eq!(find_path(&store, root, "Home"), None);
    }

    #[test]
    fn test_find_unbound_version() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([("Home.md", "x")]);
        let page = Resolver::new(&store).find(&root, "Home").unwrap().unwrap();
        assert!(page.version().is_none());
        assert_eq!(page.filename(), "Home.md");
    }

    #[test]
    fn test_find_propagates_store_errors() {
        let mut store = MemoryStore::new();
        let dangling = store.write_tree([("x.md", "x")]);
        let root = store.insert_tree(vec![TreeEntry::Tree {
            name: "broken".into(),
            id: dangling,
        }]);
        let other = MemoryStore::new();
        // `other` holds no trees, so expanding the root fails.
        let err = Resolver::new(&other).find(&root, "x").unwrap_err();
        assert!(matches!(err, StoreError::MissingObject(_)));
    }

    #[test]
    fn test_find_under_base() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([("wiki/sub/Page.md", "x"), ("Page.md", "outside")]);
        let base = store.tree_at(&root, "wiki").unwrap().unwrap();

        let page = Resolver::new(&store)
            .find_under(&base, "wiki", "Page")
            .unwrap()
            .unwrap();
        assert_eq!(page.path(), "wiki/sub/Page.md");
    }

    #[test]
    fn test_find_nearest_walks_up() {
        let mut store = MemoryStore::new();
        let root = store.write_tree([
            ("_Footer.md", "root footer"),
            ("docs/_Sidebar.md", "docs sidebar"),
            ("docs/api/Page.md", "page"),
            ("other/_Sidebar.md", "other sidebar"),
        ]);
        let resolver = Resolver::new(&store);

        let sidebar = resolver.find_nearest(&root, "docs/api", "_Sidebar").unwrap();
        assert_eq!(sidebar.unwrap().path(), "docs/_Sidebar.md");

        let footer = resolver.find_nearest(&root, "docs/api", "_Footer").unwrap();
        assert_eq!(footer.unwrap().path(), "_Footer.md");

        assert!(resolver.find_nearest(&root, "", "_Sidebar").unwrap().is_none());
        assert!(resolver.find_nearest(&root, "missing/dir", "_Header").unwrap().is_none());
    }
}
