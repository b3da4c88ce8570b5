//! Remote movie lookups: the fetch capability, its OMDb implementation and
//! the pure normalization of raw responses into catalog records.

mod fetcher;
mod normalize;
mod omdb;

pub use fetcher::MovieFetcher;
pub use normalize::{
    normalize_exact_lookup, normalize_search_results, ResponseFields, SearchResponse,
    SearchResults, DEFAULT_NOT_FOUND_DETAIL, DEFAULT_NO_RESULTS_DETAIL,
};
pub use omdb::{OmdbClient, DEFAULT_OMDB_URL};
