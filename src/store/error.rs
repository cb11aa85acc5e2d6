//! Version store error types.

use thiserror::Error;

/// Failures reading from a version store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version `{0}` not found")]
    VersionNotFound(String),

    #[error("object `{0}` not found in store")]
    MissingObject(String),

    #[error("invalid pagination: page {page}, per_page {per_page} (both must be at least 1)")]
    InvalidPagination { page: u32, per_page: u32 },

    #[error("version store read failed")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap a backend error unchanged.
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_store_error_display() {
        let err = StoreError::VersionNotFound("deadbeef".into());
        assert!(format!("{err}").contains("deadbeef"));

        let err = StoreError::backend(Error::new(ErrorKind::UnexpectedEof, "truncated pack"));
        assert!(format!("{err}").contains("read failed"));
        assert!(err.source().unwrap().to_string().contains("truncated pack"));
    }
}
