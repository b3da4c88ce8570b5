//! Personal movie catalog library.
//!
//! Movies come in from a tolerant `Key: value` text format or from an OMDb
//! lookup, and are kept in a SQLite catalog deduplicated by `(title, year)`.

pub mod catalog_store;
pub mod config;
pub mod error;
pub mod import;
pub mod movie;
pub mod remote;
pub mod service;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use error::{CatalogError, CatalogResult, StorageError};
pub use import::ValueCapture;
pub use movie::{Movie, MovieField, MovieKey};
pub use remote::{MovieFetcher, OmdbClient, SearchResults};
pub use service::{CatalogService, ImportSummary, SaveOutcome};
