//! `[repo]` section configuration.
//!
//! Contains the location of the git repository and which revision pages
//! are read from by default.
//!
//! # Example
//!
//! ```toml
//! [repo]
//! path = "."                  # Repository root (relative to wiki.toml)
//! ref = "master"              # Revision used when no version is given
//! page_file_dir = "wiki"      # Only look for pages below this directory
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Repository settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Repository root. Relative paths are resolved against the config
    /// file's directory.
    pub path: PathBuf,

    /// Default revision (branch, tag or commit id).
    #[serde(rename = "ref")]
    pub head: String,

    /// Subdirectory holding all pages. `None` searches the whole tree.
    pub page_file_dir: Option<String>,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            head: "master".to_owned(),
            page_file_dir: None,
        }
    }
}

impl RepoConfig {
    /// `page_file_dir` without trailing slashes; `None` when unset or empty.
    ///
    /// A leading `/` is kept so validation can reject absolute paths.
    pub fn page_file_dir(&self) -> Option<&str> {
        self.page_file_dir
            .as_deref()
            .map(|dir| dir.trim_end_matches('/'))
            .filter(|dir| !dir.is_empty())
    }
}
