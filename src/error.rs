//! Errors surfaced to wiki callers.
//!
//! A missing page is not an error: lookups return `Ok(None)`.

use thiserror::Error;

use crate::render::RenderError;
use crate::store::StoreError;

/// Wiki-level errors.
#[derive(Debug, Error)]
pub enum WikiError {
    /// The requested version does not resolve to a commit.
    #[error("version `{0}` not found")]
    VersionNotFound(String),

    /// Any other failure reading the version store, unchanged.
    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// History was requested for a page not bound to a version.
    #[error("page `{0}` is not bound to a version")]
    Unbound(String),
}

impl From<StoreError> for WikiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionNotFound(version) => Self::VersionNotFound(version),
            other => Self::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_found_is_lifted() {
        let err = WikiError::from(StoreError::VersionNotFound("v9".into()));
        assert!(matches!(err, WikiError::VersionNotFound(ref v) if v == "v9"));
        assert_eq!(err.to_string(), "version `v9` not found");

        let err = WikiError::from(StoreError::MissingObject("tree 4".into()));
        assert!(matches!(err, WikiError::Store(StoreError::MissingObject(_))));
    }
}
