//! Catalog fixtures: a temporary on-disk store and an in-memory fetcher.

use super::constants::NOT_FOUND_DETAIL;
use async_trait::async_trait;
use movie_catalog::remote::{ResponseFields, SearchResponse};
use movie_catalog::{
    CatalogError, CatalogResult, CatalogService, CatalogStore, Movie, MovieFetcher,
    SqliteCatalogStore, StorageError, ValueCapture,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Builds response fields from `(key, value)` pairs.
pub fn fields(pairs: &[(&str, &str)]) -> ResponseFields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// In-memory `MovieFetcher` serving canned responses.
///
/// Titles and queries without a canned response get OMDb's not-found answer.
#[derive(Default)]
pub struct FakeFetcher {
    exact: HashMap<String, ResponseFields>,
    search: HashMap<String, SearchResponse>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fetcher whose every call fails as if the service were unreachable.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_exact(mut self, title: &str, response: ResponseFields) -> Self {
        self.exact.insert(title.to_string(), response);
        self
    }

    pub fn with_search(mut self, query: &str, response: SearchResponse) -> Self {
        self.search.insert(query.to_string(), response);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record_call(&self) -> CatalogResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(CatalogError::RemoteUnavailable(
                "Request timed out".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl MovieFetcher for FakeFetcher {
    async fn fetch_exact(&self, title: &str) -> CatalogResult<ResponseFields> {
        self.record_call()?;
        Ok(self.exact.get(title).cloned().unwrap_or_else(|| {
            fields(&[("Response", "False"), ("Error", NOT_FOUND_DETAIL)])
        }))
    }

    async fn fetch_search(&self, query: &str) -> CatalogResult<SearchResponse> {
        self.record_call()?;
        Ok(self
            .search
            .get(query)
            .cloned()
            .unwrap_or_else(|| SearchResponse {
                response: Some("False".to_string()),
                error: Some(NOT_FOUND_DETAIL.to_string()),
                items: Vec::new(),
            }))
    }
}

/// A catalog service over a fresh database in a temporary directory.
///
/// The directory is removed when the fixture is dropped.
pub struct TestCatalog {
    pub service: CatalogService,
    pub store: Arc<SqliteCatalogStore>,
    pub fetcher: Arc<FakeFetcher>,
    pub db_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestCatalog {
    pub fn new() -> Self {
        Self::with_fetcher(FakeFetcher::new())
    }

    pub fn with_fetcher(fetcher: FakeFetcher) -> Self {
        Self::build(fetcher, ValueCapture::FirstToken)
    }

    pub fn with_value_capture(value_capture: ValueCapture) -> Self {
        Self::build(FakeFetcher::new(), value_capture)
    }

    fn build(fetcher: FakeFetcher, value_capture: ValueCapture) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("movies.db");
        let store =
            Arc::new(SqliteCatalogStore::new(&db_path, 2).expect("Failed to open test catalog"));
        let fetcher = Arc::new(fetcher);
        let service = CatalogService::new(
            store.clone() as Arc<dyn CatalogStore>,
            fetcher.clone() as Arc<dyn MovieFetcher>,
            value_capture,
        );
        Self {
            service,
            store,
            fetcher,
            db_path,
            _temp_dir: temp_dir,
        }
    }

    /// `(title, year)` keys of every stored movie, sorted.
    pub fn sorted_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .store
            .get_all()
            .expect("Failed to list catalog")
            .iter()
            .map(|m| m.key().to_string())
            .collect();
        keys.sort();
        keys
    }
}

/// Store that delegates to a real one but fails the Nth `insert_if_absent`
/// call (1-based) with a storage error.
pub struct FailingStore {
    inner: Arc<SqliteCatalogStore>,
    fail_on_call: usize,
    calls: AtomicUsize,
}

impl FailingStore {
    pub fn new(inner: Arc<SqliteCatalogStore>, fail_on_call: usize) -> Self {
        Self {
            inner,
            fail_on_call,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CatalogStore for FailingStore {
    fn insert(&self, movie: &Movie) -> CatalogResult<()> {
        self.inner.insert(movie)
    }

    fn insert_if_absent(&self, movie: &Movie) -> CatalogResult<bool> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on_call {
            return Err(CatalogError::Storage(StorageError::LockPoisoned));
        }
        self.inner.insert_if_absent(movie)
    }

    fn get(&self, title: &str, year: Option<&str>) -> CatalogResult<Option<Movie>> {
        self.inner.get(title, year)
    }

    fn search_by_title(&self, fragment: &str) -> CatalogResult<Vec<Movie>> {
        self.inner.search_by_title(fragment)
    }

    fn search_by_actor(&self, fragment: &str) -> CatalogResult<Vec<Movie>> {
        self.inner.search_by_actor(fragment)
    }

    fn get_all(&self) -> CatalogResult<Vec<Movie>> {
        self.inner.get_all()
    }

    fn count(&self) -> CatalogResult<usize> {
        self.inner.count()
    }

    fn clear(&self) -> CatalogResult<usize> {
        self.inner.clear()
    }
}
