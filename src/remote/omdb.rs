//! HTTP client for the OMDb API.

use super::fetcher::MovieFetcher;
use super::normalize::{ResponseFields, SearchResponse};
use crate::error::{CatalogError, CatalogResult};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";

/// Detail for a non-2xx reply. OMDb still sends `{"Error": ...}` with some
/// of them (a bad API key comes back as 401), and that text is kept.
fn status_error_detail(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("Error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| format!("OMDb request failed with status {}", status))
}

/// `MovieFetcher` backed by the OMDb HTTP API.
pub struct OmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

/// Keeps the string-valued top-level fields of a JSON object.
fn string_fields(value: &Value) -> ResponseFields {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(key, value)| Some((key.clone(), value.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

fn request_error(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::RemoteUnavailable(format!("Request timed out: {}", e))
    } else {
        CatalogError::RemoteUnavailable(format!("Failed to reach OMDb: {}", e))
    }
}

impl OmdbClient {
    /// Create a new OMDb client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "https://www.omdbapi.com/")
    /// * `api_key` - OMDb API key, sent with every request
    /// * `timeout` - Per-request timeout, covering connect and body
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                CatalogError::RemoteUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn exact_url(&self, title: &str) -> String {
        format!(
            "{}/?t={}&apikey={}",
            self.base_url,
            urlencoding::encode(title),
            urlencoding::encode(&self.api_key)
        )
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/?s={}&apikey={}",
            self.base_url,
            urlencoding::encode(query),
            urlencoding::encode(&self.api_key)
        )
    }

    async fn get_json(&self, url: &str) -> CatalogResult<Value> {
        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::RemoteUnavailable(status_error_detail(
                status, &body,
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                request_error(e)
            } else {
                CatalogError::RemoteUnavailable(format!("Failed to parse OMDb response: {}", e))
            }
        })?;

        if !body.is_object() {
            return Err(CatalogError::RemoteUnavailable(
                "Failed to parse OMDb response: expected a JSON object".to_string(),
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl MovieFetcher for OmdbClient {
    async fn fetch_exact(&self, title: &str) -> CatalogResult<ResponseFields> {
        debug!("OMDb exact lookup for {:?}", title);
        let body = self.get_json(&self.exact_url(title)).await?;
        Ok(string_fields(&body))
    }

    async fn fetch_search(&self, query: &str) -> CatalogResult<SearchResponse> {
        debug!("OMDb search for {:?}", query);
        let body = self.get_json(&self.search_url(query)).await?;
        let fields = string_fields(&body);

        let items: Vec<ResponseFields> = body
            .get("Search")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter(|i| i.is_object()).map(string_fields).collect())
            .unwrap_or_default();

        Ok(SearchResponse {
            response: fields.get("Response").cloned(),
            error: fields.get("Error").cloned(),
            items,
        })
    }
}
