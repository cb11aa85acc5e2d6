//! `[page]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [page]
//! default_format = "markdown"   # Format for newly named pages
//! ```

use serde::{Deserialize, Serialize};

use crate::page::Format;

/// Page settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Format used by `Wiki::page_filename` when none is given.
    /// Must have a write extension, so `roff` is rejected.
    pub default_format: Format,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            default_format: Format::Markdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;
    use crate::page::Format;

    #[test]
    fn test_page_config() {
        let config = test_parse_config("[page]\ndefault_format = \"rest\"");
        assert_eq!(config.page.default_format, Format::RestructuredText);

        let config = test_parse_config("[page]\ndefault_format = \"org\"");
        assert_eq!(config.page.default_format, Format::Org);
    }

    #[test]
    fn test_page_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.page.default_format, Format::Markdown);
    }
}
