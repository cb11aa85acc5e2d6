//! Wiki configuration management for `wiki.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── page       # [page]
//! │   ├── render     # [render]
//! │   └── repo       # [repo]
//! ├── error.rs       # ConfigError
//! ├── util.rs        # Config file lookup, path checks
//! └── mod.rs         # WikiConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[repo]`    | Repository path, default ref, page directory     |
//! | `[page]`    | Default format for new pages                     |
//! | `[render]`  | Markdown extensions                              |

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{PageConfig, RenderConfig, RepoConfig};
pub use util::find_config_file;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{log, logger};

/// Default config file name searched for by [`WikiConfig::discover`].
pub const CONFIG_FILE: &str = "wiki.toml";

/// Root configuration structure representing `wiki.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WikiConfig {
    /// Path to the loaded config file; empty when parsed from a string
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    root: PathBuf,

    /// Print resolver and store debug output
    pub verbose: bool,

    pub repo: RepoConfig,

    pub page: PageConfig,

    pub render: RenderConfig,
}

impl WikiConfig {
    /// Load, normalize and validate the config file at `path`.
    ///
    /// Unknown fields are reported and ignored. Also applies `verbose`
    /// to the global logger.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = Self::from_path(path)?;
        config.config_path = path.to_path_buf();

        let root = path.parent().unwrap_or(Path::new("")).to_path_buf();
        config.set_root(&root);
        config
            .validate()
            .with_context(|| format!("invalid config in {}", path.display()))?;

        logger::set_verbose(config.verbose);
        Ok(config)
    }

    /// Search upward from `start` for `wiki.toml` and load it.
    pub fn discover(start: &Path) -> Result<Self> {
        let Some(path) = find_config_file(start, Path::new(CONFIG_FILE)) else {
            bail!(ConfigError::Validation(format!(
                "{CONFIG_FILE} not found in {} or any parent directory",
                start.display()
            )));
        };
        Self::load(&path)
    }

    /// Parse configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse config and collect unknown field paths.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Set root and resolve `repo.path` against it.
    pub fn set_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        if self.repo.path.is_relative() {
            self.repo.path = root.join(&self.repo.path);
        }
    }

    /// Repository location after root resolution.
    pub fn repo_path(&self) -> &Path {
        &self.repo.path
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.repo.head.trim().is_empty() {
            bail!(ConfigError::Validation("[repo.ref] must not be empty".into()));
        }

        if let Some(dir) = self.repo.page_file_dir()
            && !util::is_relative_subdir(dir)
        {
            bail!(ConfigError::Validation(format!(
                "[repo.page_file_dir] `{dir}` must be a relative path inside the repository"
            )));
        }

        if !self.page.default_format.is_writable() {
            bail!(ConfigError::Validation(format!(
                "[page.default_format] `{}` cannot be used for new pages",
                self.page.default_format
            )));
        }

        Ok(())
    }
}

/// Parse a config snippet, failing on unknown fields.
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> WikiConfig {
    let (parsed, ignored) = WikiConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Format;
    use tempfile::TempDir;

    #[test]
    fn test_from_str_invalid_toml() {
        // Unclosed table header
        assert!(WikiConfig::from_str("[repo\nref = \"main\"").is_err());
    }

    #[test]
    fn test_wiki_config_default() {
        let config = WikiConfig::default();
        assert!(!config.verbose);
        assert_eq!(config.repo.head, "master");
        assert_eq!(config.page.default_format, Format::Markdown);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let (_, ignored) =
            WikiConfig::parse_with_ignored("[repo]\nref = \"main\"\nbranch = \"x\"\n[extra]\na = 1")
                .unwrap();
        assert!(ignored.iter().any(|f| f == "repo.branch"));
        assert!(ignored.iter().any(|f| f == "extra"));
    }

    #[test]
    fn test_no_unknown_fields() {
        let config = test_parse_config("verbose = true\n[page]\ndefault_format = \"org\"");
        assert!(config.verbose);
        assert_eq!(config.page.default_format, Format::Org);
    }

    #[test]
    fn test_validate_rejects_empty_ref() {
        let config = test_parse_config("[repo]\nref = \"  \"");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[repo.ref]"));
    }

    #[test]
    fn test_validate_rejects_escaping_page_dir() {
        for dir in ["/abs", "pages/../..", ".."] {
            let config = test_parse_config(&format!("[repo]\npage_file_dir = \"{dir}\""));
            assert!(config.validate().is_err(), "{dir} should be rejected");
        }
        let config = test_parse_config("[repo]\npage_file_dir = \"pages/en\"");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unwritable_format() {
        let config = test_parse_config("[page]\ndefault_format = \"roff\"");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_resolves_repo_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[repo]\npath = \"wiki.git\"\nref = \"main\"").unwrap();

        let config = WikiConfig::load(&path).unwrap();
        assert_eq!(config.config_path, path);
        assert_eq!(config.get_root(), temp.path());
        assert_eq!(config.repo_path(), temp.path().join("wiki.git"));
        assert_eq!(config.repo.head, "main");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = WikiConfig::load(&temp.path().join(CONFIG_FILE)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::Io(..))
        ));
    }

    #[test]
    fn test_discover_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "verbose = false").unwrap();

        let config = WikiConfig::discover(&nested).unwrap();
        assert_eq!(config.get_root(), temp.path());
    }
}
