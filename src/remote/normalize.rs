//! Conversion of raw lookup responses into catalog records.
//!
//! Responses use the OMDb field names: a `Response` flag of `"True"` or
//! `"False"`, an optional `Error` text, and the capitalized record keys.

use crate::error::{CatalogError, CatalogResult};
use crate::movie::{Movie, MovieField};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Top-level string fields of a lookup response, keyed by wire name.
pub type ResponseFields = HashMap<String, String>;

pub const DEFAULT_NOT_FOUND_DETAIL: &str = "Movie not found.";
pub const DEFAULT_NO_RESULTS_DETAIL: &str = "No movies found.";

const RESPONSE_KEY: &str = "Response";
const ERROR_KEY: &str = "Error";

/// Raw result of a free-text search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResponse {
    pub response: Option<String>,
    pub error: Option<String>,
    pub items: Vec<ResponseFields>,
}

impl SearchResponse {
    fn is_failure(&self) -> bool {
        self.response.as_deref() == Some("False")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub movies: Vec<Movie>,
    /// Service message for an empty result, shown instead of a list.
    pub error_detail: Option<String>,
}

/// Maps an exact-title response to a `Movie`.
///
/// A `"False"` response flag becomes `CatalogError::NotFound` carrying the
/// service's error text. Fields the response lacks stay absent.
pub fn normalize_exact_lookup(fields: &ResponseFields) -> CatalogResult<Movie> {
    if fields.get(RESPONSE_KEY).map(String::as_str) == Some("False") {
        let detail = fields
            .get(ERROR_KEY)
            .cloned()
            .unwrap_or_else(|| DEFAULT_NOT_FOUND_DETAIL.to_string());
        return Err(CatalogError::NotFound(detail));
    }

    Movie::from_field_lookup(|field| fields.get(field.key()).cloned()).ok_or_else(|| {
        CatalogError::RemoteUnavailable("Malformed response: missing Title".to_string())
    })
}

/// Maps a search response to title/year-only records.
pub fn normalize_search_results(response: &SearchResponse) -> SearchResults {
    if response.is_failure() {
        return SearchResults {
            movies: Vec::new(),
            error_detail: Some(
                response
                    .error
                    .clone()
                    .unwrap_or_else(|| DEFAULT_NO_RESULTS_DETAIL.to_string()),
            ),
        };
    }

    let movies = response
        .items
        .iter()
        .filter_map(|item| {
            let movie = Movie::from_field_lookup(|field| match field {
                MovieField::Title | MovieField::Year => item.get(field.key()).cloned(),
                _ => None,
            });
            if movie.is_none() {
                warn!("Skipping search result without a title: {:?}", item);
            }
            movie
        })
        .collect();

    SearchResults {
        movies,
        error_detail: None,
    }
}
