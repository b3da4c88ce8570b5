use super::normalize::{ResponseFields, SearchResponse};
use crate::error::CatalogResult;
use async_trait::async_trait;

/// Source of raw movie lookup responses.
///
/// Implementations only fetch; turning responses into `Movie`s is left to
/// the normalizers so it can be tested without a network.
#[async_trait]
pub trait MovieFetcher: Send + Sync {
    /// Exact-title lookup. Returns the top-level string fields of the response.
    async fn fetch_exact(&self, title: &str) -> CatalogResult<ResponseFields>;

    /// Free-text search.
    async fn fetch_search(&self, query: &str) -> CatalogResult<SearchResponse>;
}
