//! Wiki facade: page lookup at a version of the repository.

use crate::config::WikiConfig;
use crate::error::WikiError;
use crate::page::{Format, PageHandle, name};
use crate::render::MarkupRenderer;
use crate::resolve::Resolver;
use crate::store::{GitStore, VersionStore};

const FOOTER: &str = "_Footer";
const SIDEBAR: &str = "_Sidebar";

/// A wiki backed by a version store.
#[derive(Debug)]
pub struct Wiki<S: VersionStore> {
    store: S,
    config: WikiConfig,
}

impl Wiki<GitStore> {
    /// Open the git repository named by `config.repo.path`.
    pub fn open(config: WikiConfig) -> Result<Self, WikiError> {
        let store = GitStore::open(config.repo_path())?;
        Ok(Self::new(store, config))
    }
}

impl<S: VersionStore> Wiki<S> {
    pub fn new(store: S, config: WikiConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    /// Renderer configured from the `[render]` section.
    pub fn renderer(&self) -> MarkupRenderer {
        MarkupRenderer::new(self.config.render.markdown_options())
    }

    /// Find the page called `name` at `version`.
    ///
    /// `Ok(None)` when no page matches. The handle is bound to the
    /// resolved commit.
    pub fn find_page(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Option<PageHandle<'_, S>>, WikiError> {
        let commit = self.store.resolve_commit(version)?;
        let root = self.store.tree_of(&commit)?;
        let resolver = Resolver::new(&self.store);

        let found = match self.config.repo.page_file_dir() {
            Some(dir) => match self.store.tree_at(&root, dir)? {
                Some(tree) => resolver.find_under(&tree, dir, name)?,
                None => None,
            },
            None => resolver.find(&root, name)?,
        };

        Ok(found.map(|page| page.at_version(commit)))
    }

    /// Find `name` at the configured default ref.
    pub fn page(&self, name: &str) -> Result<Option<PageHandle<'_, S>>, WikiError> {
        self.find_page(name, &self.config.repo.head)
    }

    /// Nearest `_Footer` page for `page`.
    pub fn footer(
        &self,
        page: &PageHandle<'_, S>,
    ) -> Result<Option<PageHandle<'_, S>>, WikiError> {
        self.sub_page(page, FOOTER)
    }

    /// Nearest `_Sidebar` page for `page`.
    pub fn sidebar(
        &self,
        page: &PageHandle<'_, S>,
    ) -> Result<Option<PageHandle<'_, S>>, WikiError> {
        self.sub_page(page, SIDEBAR)
    }

    fn sub_page(
        &self,
        page: &PageHandle<'_, S>,
        fragment: &str,
    ) -> Result<Option<PageHandle<'_, S>>, WikiError> {
        if page.filename().starts_with(name::RESERVED_PREFIX) {
            return Ok(None);
        }
        let Some(version) = page.version() else {
            return Ok(None);
        };

        let root = self.store.tree_of(version)?;
        let found = Resolver::new(&self.store).find_nearest(&root, page.dir(), fragment)?;
        Ok(found.map(|sub| sub.at_version(version.clone())))
    }

    /// Filename a new page called `name` would be written to.
    ///
    /// Falls back to `[page] default_format`. `None` when the name is not
    /// a valid page name or the format cannot be written.
    pub fn page_filename(&self, name: &str, format: Option<Format>) -> Option<String> {
        name::page_filename(name, format.unwrap_or(self.config.page.default_format))
    }
}
