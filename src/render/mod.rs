//! Markup rendering collaborator.
//!
//! Pages hand their raw text and detected [`Format`] to a [`Renderer`];
//! the resolver itself never renders anything.

mod markdown;

pub use markdown::{MarkdownOptions, to_html};

use thiserror::Error;

use crate::page::Format;

/// Rendering failures.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no renderer available for {0} pages")]
    Unsupported(Format),

    #[error("`{0}` has no recognized markup format")]
    UnknownFormat(String),
}

/// Converts page source in a given format to HTML.
pub trait Renderer {
    fn render(&self, format: Format, source: &str) -> Result<String, RenderError>;
}

/// Default renderer: Markdown via pulldown-cmark, other formats unsupported.
#[derive(Debug, Clone, Copy)]
pub struct MarkupRenderer {
    markdown: MarkdownOptions,
}

/// All Markdown extensions on, like the `[render]` defaults.
impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new(MarkdownOptions::all())
    }
}

impl MarkupRenderer {
    pub fn new(markdown: MarkdownOptions) -> Self {
        Self { markdown }
    }

    pub fn markdown_options(&self) -> MarkdownOptions {
        self.markdown
    }
}

impl Renderer for MarkupRenderer {
    fn render(&self, format: Format, source: &str) -> Result<String, RenderError> {
        match format {
            Format::Markdown => Ok(to_html(source, self.markdown)),
            other => Err(RenderError::Unsupported(other)),
        }
    }
}
