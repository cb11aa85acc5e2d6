//! `[render]` section configuration.
//!
//! Toggles pulldown-cmark extensions used for Markdown pages.
//!
//! # Example
//!
//! ```toml
//! [render]
//! tables = true
//! footnotes = true
//! strikethrough = true
//! task_lists = true
//! heading_attributes = false
//! ```

use serde::{Deserialize, Serialize};

use crate::render::MarkdownOptions;

/// Markdown rendering settings. Every extension is on by default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub task_lists: bool,
    pub heading_attributes: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }
}

impl RenderConfig {
    pub fn markdown_options(&self) -> MarkdownOptions {
        MarkdownOptions {
            tables: self.tables,
            footnotes: self.footnotes,
            strikethrough: self.strikethrough,
            task_lists: self.task_lists,
            heading_attributes: self.heading_attributes,
        }
    }
}
