//! HTTP client for the backing document store.
//!
//! Plain GETs against a base URL; no retries, no auth. Every request URL
//! doubles as the cache key for the content it returns.

mod error;
pub mod types;

use std::time::Duration;

use reqwest::{header::HeaderMap, header::HeaderValue, Client};
use serde::de::DeserializeOwned;
use url::Url;

pub use error::StoreError;
pub use types::{Aliases, MappingDocument, SearchResponse};

/// Options for the underlying HTTP client
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Per-request deadline. `None` waits for as long as the store takes.
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct StoreClient {
    /// Base URL with any trailing slash removed
    base: String,
    client: Client,
}

impl StoreClient {
    pub fn new(remote: &Url, config: ClientConfig) -> Result<Self, StoreError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Accept", HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base: remote.as_str().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    /// Get the base URL requests are built from
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn aliases_url(&self) -> String {
        format!("{}/_aliases", self.base)
    }

    pub fn index_mapping_url(&self, index: &str) -> String {
        format!("{}/{}/_mapping", self.base, index)
    }

    pub fn type_mapping_url(&self, index: &str, doc_type: &str) -> String {
        format!("{}/{}/{}/_mapping", self.base, index, doc_type)
    }

    pub fn search_url(&self, index: &str, doc_type: &str, from: u64, size: u64) -> String {
        format!(
            "{}/{}/{}/_search?from={}&size={}",
            self.base, index, doc_type, from, size
        )
    }

    pub fn document_url(&self, index: &str, doc_type: &str, id: &str) -> String {
        format!("{}/{}/{}/{}", self.base, index, doc_type, id)
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, StoreError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::HttpStatus(status, response.text().await?));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| StoreError::Decode {
            url: url.to_string(),
            source,
        })
    }

    pub async fn aliases(&self) -> Result<Aliases, StoreError> {
        self.get_json(&self.aliases_url()).await
    }

    pub async fn index_mapping(&self, index: &str) -> Result<MappingDocument, StoreError> {
        self.get_json(&self.index_mapping_url(index)).await
    }

    pub async fn search(
        &self,
        index: &str,
        doc_type: &str,
        from: u64,
        size: u64,
    ) -> Result<SearchResponse, StoreError> {
        self.get_json(&self.search_url(index, doc_type, from, size))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> StoreClient {
        StoreClient::new(&Url::parse(base).unwrap(), ClientConfig::default()).unwrap()
    }

    #[test]
    fn test_urls_from_bare_host() {
        let c = client("http://localhost:9200");
        assert_eq!(c.aliases_url(), "http://localhost:9200/_aliases");
        assert_eq!(
            c.index_mapping_url("movies"),
            "http://localhost:9200/movies/_mapping"
        );
        assert_eq!(
            c.type_mapping_url("movies", "film"),
            "http://localhost:9200/movies/film/_mapping"
        );
        assert_eq!(
            c.search_url("movies", "film", 20, 10),
            "http://localhost:9200/movies/film/_search?from=20&size=10"
        );
        assert_eq!(
            c.document_url("movies", "film", "tt0111161"),
            "http://localhost:9200/movies/film/tt0111161"
        );
    }

    #[test]
    fn test_urls_keep_base_path() {
        let c = client("http://proxy.local/es/");
        assert_eq!(c.base_url(), "http://proxy.local/es");
        assert_eq!(c.aliases_url(), "http://proxy.local/es/_aliases");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_request_error() {
        // Grab a free port, then close it so nothing answers there
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let c = client(&format!("http://127.0.0.1:{}", port));

        let err = c.aliases().await.unwrap_err();
        assert!(matches!(err, StoreError::Request(_)), "{:?}", err);
    }
}
