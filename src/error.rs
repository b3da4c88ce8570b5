//! Error types shared by the catalog store, the remote lookup layer and the
//! catalog service.
//!
//! Skipped import blocks and duplicate inserts are not errors: they only show
//! up in counts (`ImportSummary`, `insert_if_absent` returning `false`).

use thiserror::Error;

/// Failures of the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("catalog connection lock poisoned")]
    LockPoisoned,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The remote service reported no match. Carries the service's own message.
    #[error("{0}")]
    NotFound(String),

    /// Transport, timeout or malformed-response failure during a remote lookup.
    #[error("{0}")]
    RemoteUnavailable(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("movie already in catalog: {title} ({})", year.as_deref().unwrap_or("N/A"))]
    DuplicateKey { title: String, year: Option<String> },

    #[error("invalid movie record: {0}")]
    InvalidRecord(String),
}

impl CatalogError {
    /// Text a presentation layer should show for this failure.
    ///
    /// Remote failures surface the service-provided text verbatim.
    pub fn detail(&self) -> String {
        match self {
            CatalogError::NotFound(detail) | CatalogError::RemoteUnavailable(detail) => {
                detail.clone()
            }
            other => format!("Error: {}", other),
        }
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Storage(StorageError::Sqlite(e))
    }
}

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;
