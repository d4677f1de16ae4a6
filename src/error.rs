use std::sync::Arc;
use thiserror::Error;

/// Failure handed to every request that waited on a failed batch.
///
/// Absence is not an error: a key the fetch did not return resolves to
/// `Ok(None)`.
#[derive(Debug, Error, PartialEq)]
pub enum LoadError<E> {
    /// The batch fetch failed as a whole. Every waiter of the batch receives
    /// the same shared error value.
    #[error("batch fetch failed: {0}")]
    BatchFetch(Arc<E>),
}

// Manual implementation is used to omit applying unnecessary Clone bounds.
impl<E> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            LoadError::BatchFetch(e) => LoadError::BatchFetch(Arc::clone(e)),
        }
    }
}

impl<E> LoadError<E> {
    /// The error returned by the batch fetch.
    pub fn fetch_error(&self) -> &E {
        match self {
            LoadError::BatchFetch(e) => e,
        }
    }
}

/// Programming errors in the use of a scope's cache.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("an outcome for key {key} is already recorded in this scope")]
    DuplicatePut { key: String },
}

#[derive(Debug, Error)]
pub enum LabelsError {
    #[error("label store query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Error)]
pub enum HoldersError {
    #[error("malformed holders response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graphql error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ResultSetError {
    #[error("malformed result set: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row} has {cells} cells for {columns} columns")]
    RowTooWide {
        row: usize,
        cells: usize,
        columns: usize,
    },
}

#[derive(Debug, Error)]
pub enum TokenInfoError {
    #[error("malformed token info response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("graphql error: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("token info response carried no data")]
    MissingData,
}
