//! Error types for the search index.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by indexing and search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The caller supplied an empty or whitespace-only query string.
    #[error("Search query must not be empty")]
    EmptyQuery,

    /// A filter value (entity type or field name) was empty.
    #[error("Invalid {kind} filter: {value:?}")]
    InvalidFilter {
        kind: &'static str,
        value: String,
    },

    /// Database operation failure.
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// Filesystem failure while opening or maintaining the index file.
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A search hook failed while adjusting a query or its results.
    ///
    /// Unregistered hook names never produce this variant; they are
    /// skipped with a warning. Only a handler that runs and returns an
    /// error surfaces here.
    #[error("{phase} hook failed for entity '{entity}': {cause}")]
    Hook {
        entity: String,
        phase: &'static str,
        cause: anyhow::Error,
    },

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl SearchError {
    /// Returns true for errors caused by bad caller input rather than
    /// by the index itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SearchError::EmptyQuery | SearchError::InvalidFilter { .. }
        )
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(err: rusqlite::Error) -> Self {
        SearchError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

/// Result type alias using [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;
