//! Markup format classification by filename extension.

use serde::{Deserialize, Serialize};

/// Markup dialect of a page, derived from its filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// `.md`, `.mkd`, `.mkdn`, `.mdown`, `.markdown`
    Markdown,
    /// `.textile`
    Textile,
    /// `.rdoc`
    Rdoc,
    /// `.org`
    Org,
    /// `.creole`
    Creole,
    /// `.rst`, `.rest`, optionally followed by `.txt`
    #[serde(alias = "rest")]
    RestructuredText,
    /// `.asciidoc`
    Asciidoc,
    /// `.pod`
    Pod,
    /// Single digit extension (man page section). Read-only.
    Roff,
}

impl Format {
    /// Every format, in classification order.
    pub const ALL: [Self; 9] = [
        Self::Markdown,
        Self::Textile,
        Self::Rdoc,
        Self::Org,
        Self::Creole,
        Self::RestructuredText,
        Self::Asciidoc,
        Self::Pod,
        Self::Roff,
    ];

    /// Detect format from a filename, case-insensitively.
    ///
    /// `notes.txt` is not a page, `notes.rst.txt` is.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        let (rest, ext) = lower.rsplit_once('.')?;

        if ext == "txt" {
            return match rest.rsplit_once('.') {
                Some((stem, "rst" | "rest")) if !stem.is_empty() => Some(Self::RestructuredText),
                _ => None,
            };
        }
        if rest.is_empty() {
            return None;
        }

        match ext {
            "md" | "mkd" | "mkdn" | "mdown" | "markdown" => Some(Self::Markdown),
            "textile" => Some(Self::Textile),
            "rdoc" => Some(Self::Rdoc),
            "org" => Some(Self::Org),
            "creole" => Some(Self::Creole),
            "rst" | "rest" => Some(Self::RestructuredText),
            "asciidoc" => Some(Self::Asciidoc),
            "pod" => Some(Self::Pod),
            d if d.len() == 1 && d.as_bytes()[0].is_ascii_digit() => Some(Self::Roff),
            _ => None,
        }
    }

    /// Extension used when writing a new page in this format.
    ///
    /// Roff pages are legacy numeric-extension content and have none.
    pub const fn extension(self) -> Option<&'static str> {
        match self {
            Self::Markdown => Some("md"),
            Self::Textile => Some("textile"),
            Self::Rdoc => Some("rdoc"),
            Self::Org => Some("org"),
            Self::Creole => Some("creole"),
            Self::RestructuredText => Some("rest"),
            Self::Asciidoc => Some("asciidoc"),
            Self::Pod => Some("pod"),
            Self::Roff => None,
        }
    }

    /// Display name for this format.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Textile => "textile",
            Self::Rdoc => "rdoc",
            Self::Org => "org",
            Self::Creole => "creole",
            Self::RestructuredText => "rest",
            Self::Asciidoc => "asciidoc",
            Self::Pod => "pod",
            Self::Roff => "roff",
        }
    }

    /// Check if new pages can be written in this format.
    #[inline]
    pub const fn is_writable(self) -> bool {
        self.extension().is_some()
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
