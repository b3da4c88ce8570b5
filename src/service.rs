//! Catalog operations exposed to the presentation layer.
//!
//! The service holds no state of its own beyond its collaborators: the store,
//! the remote fetcher and the import parsing mode.

use crate::catalog_store::CatalogStore;
use crate::error::CatalogResult;
use crate::import::{parse_movies, ValueCapture};
use crate::movie::Movie;
use crate::remote::{normalize_exact_lookup, normalize_search_results, MovieFetcher, SearchResults};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Result of a bulk text import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Movies newly stored.
    pub added: usize,
    /// Parsed movies whose key was already present (or repeated in the input).
    pub skipped: usize,
}

impl ImportSummary {
    pub fn message(&self) -> &'static str {
        if self.added > 0 {
            "Movies added to database!"
        } else {
            "No new movies added (all already exist)."
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub added: bool,
}

impl SaveOutcome {
    pub fn message(&self) -> &'static str {
        if self.added {
            "Movie saved to database!"
        } else {
            "Movie already exists in database!"
        }
    }
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    fetcher: Arc<dyn MovieFetcher>,
    value_capture: ValueCapture,
}

impl CatalogService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        fetcher: Arc<dyn MovieFetcher>,
        value_capture: ValueCapture,
    ) -> Self {
        Self {
            store,
            fetcher,
            value_capture,
        }
    }

    /// Parses `text` into movies and stores the ones not yet in the catalog.
    ///
    /// Blocks without a title are dropped before counting, so they show up in
    /// neither `added` nor `skipped`.
    pub fn import_from_text(&self, text: &str) -> CatalogResult<ImportSummary> {
        let movies: Vec<Movie> = parse_movies(text, self.value_capture).collect();
        let added = self.store.insert_all_if_absent(&movies)?;
        let summary = ImportSummary {
            added,
            skipped: movies.len() - added,
        };
        info!(
            "Imported {} movies ({} added, {} skipped)",
            movies.len(),
            summary.added,
            summary.skipped
        );
        Ok(summary)
    }

    /// Stores a remotely fetched movie unless its key is already present.
    pub fn save_from_remote(&self, movie: &Movie) -> CatalogResult<SaveOutcome> {
        let added = self.store.insert_if_absent(movie)?;
        if added {
            info!("Saved {} to catalog", movie);
        }
        Ok(SaveOutcome { added })
    }

    pub fn search_local_by_title(&self, fragment: &str) -> CatalogResult<Vec<Movie>> {
        self.store.search_by_title(fragment)
    }

    pub fn search_local_by_actor(&self, fragment: &str) -> CatalogResult<Vec<Movie>> {
        self.store.search_by_actor(fragment)
    }

    pub fn list_local(&self) -> CatalogResult<Vec<Movie>> {
        self.store.get_all()
    }

    /// Exact-title lookup on the remote service.
    pub async fn lookup_remote_exact(&self, title: &str) -> CatalogResult<Movie> {
        let fields = self.fetcher.fetch_exact(title).await?;
        normalize_exact_lookup(&fields)
    }

    /// Free-text search on the remote service.
    pub async fn lookup_remote_search(&self, query: &str) -> CatalogResult<SearchResults> {
        let response = self.fetcher.fetch_search(query).await?;
        Ok(normalize_search_results(&response))
    }
}
