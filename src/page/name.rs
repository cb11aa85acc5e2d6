//! Page name matching and canonicalization.
//!
//! Human page names ("Bilbo Baggins") and stored filenames
//! ("Bilbo-Baggins.md") meet in canonical form: every space and `/`
//! becomes `-`. All functions here are pure.

use regex::Regex;
use std::sync::LazyLock;

use super::Format;

/// Filenames accepted as pages, capturing the stem.
///
/// The stem may hold any character, newlines included. Extensions fold
/// ASCII case only, matching [`Format::from_filename`].
static PAGE_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^(.+)\.(?i-u:md|mkdn?|mdown|markdown|textile|rdoc|org|creole|re?st(?:\.txt)?|asciidoc|pod|[0-9])$",
    )
    .unwrap()
});

/// Prefix reserved for non-page fragments (`_Footer.md`, `_Sidebar.md`).
pub const RESERVED_PREFIX: char = '_';

/// Return the stem of `filename` if it has a page extension.
///
/// ```ignore
/// assert_eq!(valid_page_filename("Home.md"), Some("Home"));
/// assert_eq!(valid_page_filename("notes.txt"), None);
/// ```
pub fn valid_page_filename(filename: &str) -> Option<&str> {
    PAGE_FILENAME
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|stem| stem.as_str())
}

/// Like [`valid_page_filename`], but rejects reserved `_` fragments.
pub fn valid_page_name(filename: &str) -> Option<&str> {
    let stem = valid_page_filename(filename)?;
    if basename(filename).starts_with(RESERVED_PREFIX) {
        return None;
    }
    Some(stem)
}

/// Normalize a name for comparison: spaces and `/` become `-`.
pub fn canonicalize(name: &str) -> String {
    name.replace([' ', '/'], "-")
}

/// Check whether `filename` is the page a caller means by `name`.
///
/// Reserved `_` fragments are not rejected here: `_Footer` matches
/// `_Footer.md`.
pub fn matches_page(name: &str, filename: &str) -> bool {
    valid_page_filename(filename).is_some_and(|stem| canonicalize(name) == canonicalize(stem))
}

/// Filename a new page called `name` would be written to.
///
/// `None` for formats without a write extension, and for names that
/// would produce a reserved or empty page.
pub fn page_filename(name: &str, format: Format) -> Option<String> {
    let ext = format.extension()?;
    let filename = format!("{}.{ext}", canonicalize(name));
    valid_page_name(&filename).is_some().then_some(filename)
}

/// Display title of a stored page name (`Bilbo-Baggins` -> `Bilbo Baggins`).
pub fn title(name: &str) -> String {
    name.replace('-', " ")
}

/// Last path segment of a slash-separated path.
#[inline]
pub(crate) fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
