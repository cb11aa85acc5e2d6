//! Resolved wiki pages.
//!
//! # Module Structure
//!
//! ```text
//! page/
//! ├── format.rs   # Format (markup dialect by extension)
//! ├── name.rs     # filename validation, canonical names
//! └── mod.rs      # PageHandle (this file)
//! ```

mod format;
pub mod name;

pub use format::Format;
pub use name::{
    canonicalize, matches_page, page_filename, valid_page_filename, valid_page_name,
};

use std::borrow::Cow;
use std::cell::OnceCell;
use std::fmt;

use crate::error::WikiError;
use crate::render::{RenderError, Renderer};
use crate::store::{Pagination, StoreError, VersionStore};

/// A page found in a version store tree.
///
/// The handle borrows the store it was resolved from. Content and rendered
/// HTML are read lazily and cached for the handle's lifetime. The version
/// is unset when the resolver returns the handle and can be bound once.
pub struct PageHandle<'s, S: VersionStore + ?Sized> {
    store: &'s S,
    blob: S::Blob,
    /// Slash-separated, relative to the tree root, ends with the filename.
    path: String,
    version: OnceCell<S::Commit>,
    raw: OnceCell<Vec<u8>>,
    formatted: OnceCell<String>,
}

impl<'s, S: VersionStore + ?Sized> PageHandle<'s, S> {
    pub(crate) fn new(store: &'s S, blob: S::Blob, path: String) -> Self {
        Self {
            store,
            blob,
            path,
            version: OnceCell::new(),
            raw: OnceCell::new(),
            formatted: OnceCell::new(),
        }
    }

    /// Bind a fresh handle to `version`.
    pub(crate) fn at_version(self, version: S::Commit) -> Self {
        Self {
            version: OnceCell::from(version),
            ..self
        }
    }

    // ========================================================================
    // Location
    // ========================================================================

    /// Store handle of the page's blob.
    pub fn blob(&self) -> &S::Blob {
        &self.blob
    }

    /// Full path from the tree root, e.g. `docs/Home.md`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name, e.g. `Home.md`.
    pub fn filename(&self) -> &str {
        name::basename(&self.path)
    }

    /// Directory part of the path; empty at the root.
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    /// Page name: the filename without its extension.
    pub fn name(&self) -> &str {
        let filename = self.filename();
        valid_page_filename(filename).unwrap_or(filename)
    }

    pub fn title(&self) -> String {
        name::title(self.name())
    }

    /// Extension-free path with spaces as hyphens, e.g. `docs/Bilbo-Baggins`.
    pub fn url_path(&self) -> String {
        let path = match self.dir() {
            "" => self.name().to_owned(),
            dir => format!("{dir}/{}", self.name()),
        };
        path.replace(' ', "-")
    }

    /// Markup format detected from the filename.
    pub fn format(&self) -> Option<Format> {
        Format::from_filename(self.filename())
    }

    // ========================================================================
    // Version
    // ========================================================================

    /// Commit this page was resolved at, once bound.
    pub fn version(&self) -> Option<&S::Commit> {
        self.version.get()
    }

    /// Bind the page to the commit it was resolved against.
    ///
    /// Returns the rejected commit if a version is already bound.
    pub fn bind_version(&self, version: S::Commit) -> Result<(), S::Commit> {
        self.version.set(version)
    }

    /// Commits that changed this page, newest first, up to the bound version.
    pub fn versions(&self, pagination: Pagination) -> Result<Vec<S::Commit>, WikiError> {
        let version = self
            .version()
            .ok_or_else(|| WikiError::Unbound(self.path.clone()))?;
        Ok(self.store.log_of(version, &self.path, pagination)?)
    }

    // ========================================================================
    // Content
    // ========================================================================

    /// Raw bytes of the page, read from the store on first access.
    pub fn raw_data(&self) -> Result<&[u8], StoreError> {
        if let Some(raw) = self.raw.get() {
            return Ok(raw.as_slice());
        }
        let data = self.store.data_of(&self.blob)?;
        Ok(self.raw.get_or_init(|| data).as_slice())
    }

    /// Page content as text; invalid UTF-8 is replaced.
    pub fn text_data(&self) -> Result<Cow<'_, str>, StoreError> {
        Ok(String::from_utf8_lossy(self.raw_data()?))
    }

    /// HTML produced by `renderer` for this page's format, rendered once.
    pub fn formatted_data(&self, renderer: &dyn Renderer) -> Result<&str, WikiError> {
        if let Some(html) = self.formatted.get() {
            return Ok(html.as_str());
        }
        let format = self
            .format()
            .ok_or_else(|| RenderError::UnknownFormat(self.filename().to_owned()))?;
        let html = renderer.render(format, &self.text_data()?)?;
        Ok(self.formatted.get_or_init(|| html).as_str())
    }
}

impl<S: VersionStore + ?Sized> fmt::Debug for PageHandle<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHandle")
            .field("path", &self.path)
            .field("blob", &self.blob)
            .field("version", &self.version.get())
            .finish()
    }
}
