//! Stock-photo search client (Pexels-shaped API)
//!
//! Keywords are joined with `", "` into a single query string and the API key
//! travels in the Authorization header, matching the provider's contract.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use std::time::Duration;
use tracing::{debug, error, info, instrument};

use crate::StyleCastError;
use crate::config::PhotosConfig;
use crate::models::Photo;

/// Photo search API client
pub struct PhotoClient {
    client: ClientWithMiddleware,
    config: PhotosConfig,
}

impl PhotoClient {
    /// Create a new photo search client
    pub fn new(config: PhotosConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("StyleCast/", env!("CARGO_PKG_VERSION")))
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, config })
    }

    /// Search for photos matching the given keywords.
    #[instrument(skip(self))]
    pub async fn search(&self, keywords: &[String]) -> crate::Result<Vec<Photo>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| StyleCastError::config("Photo API key is not configured"))?;

        let query = keywords.join(", ");
        let url = format!(
            "{}/search?query={}&per_page={}",
            self.config.base_url,
            urlencoding::encode(&query),
            self.config.per_page
        );

        info!("Searching photos for '{query}'");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, api_key)
            .send()
            .await
            .map_err(|e| {
                error!("Photo search request failed: {e}");
                StyleCastError::api(format!("Photo search request failed: {e}"))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            error!("Photo API authentication failed (HTTP 401)");
            return Err(StyleCastError::api(
                "Invalid photo API key. Please check your configuration.",
            ));
        }
        if !status.is_success() {
            error!("Photo API request failed with status {status}");
            return Err(StyleCastError::api(format!(
                "Photo API request failed with status: {status}"
            )));
        }

        let body: pexels::SearchResponse = response.json().await.map_err(|e| {
            error!("Failed to parse photo search response: {e}");
            StyleCastError::api("Invalid photo data received from provider")
        })?;

        debug!("Photo search returned {} results", body.photos.len());

        Ok(body.photos.into_iter().map(Photo::from).collect())
    }
}

/// Pexels API response structures
mod pexels {
    use serde::Deserialize;

    use crate::models::Photo;

    #[derive(Debug, Deserialize)]
    pub struct SearchResponse {
        #[serde(default)]
        pub photos: Vec<PhotoEntry>,
    }

    #[derive(Debug, Deserialize)]
    pub struct PhotoEntry {
        pub id: u64,
        pub url: String,
        pub photographer: String,
        pub alt: Option<String>,
        pub src: PhotoSources,
    }

    #[derive(Debug, Deserialize)]
    pub struct PhotoSources {
        pub medium: String,
    }

    impl From<PhotoEntry> for Photo {
        fn from(entry: PhotoEntry) -> Self {
            Photo {
                id: entry.id,
                url: entry.url,
                photographer: entry.photographer,
                alt: entry.alt,
                src: entry.src.medium,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> PhotoClient {
        let config = PhotosConfig {
            api_key: Some("test_photo_key_123".to_string()),
            base_url: server.base_url(),
            per_page: 5,
            timeout_seconds: 5,
            max_retries: 0,
        };
        PhotoClient::new(config).unwrap()
    }

    fn photo_body(id: u64, alt: &str) -> serde_json::Value {
        json!({
            "id": id,
            "url": format!("https://photos.example/{id}"),
            "photographer": "Test Photographer",
            "alt": alt,
            "src": {"medium": format!("https://img.example/{id}-medium.jpg")}
        })
    }

    #[tokio::test]
    async fn test_search_joins_keywords_and_sends_key() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("query", "Woman casual, Woman formal")
                .query_param("per_page", "5")
                .header("authorization", "test_photo_key_123");
            then.status(200)
                .json_body(json!({"photos": [photo_body(1, "outfit")]}));
        });

        let client = client_for(&server);
        let photos = client
            .search(&["Woman casual".to_string(), "Woman formal".to_string()])
            .await
            .unwrap();

        mock.assert();
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, 1);
        assert_eq!(photos[0].src, "https://img.example/1-medium.jpg");
        assert_eq!(photos[0].alt.as_deref(), Some("outfit"));
    }

    #[tokio::test]
    async fn test_search_empty_result_set() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!({"photos": []}));
        });

        let client = client_for(&server);
        let photos = client.search(&["Man vintage".to_string()]).await.unwrap();
        assert!(photos.is_empty());
    }

    #[tokio::test]
    async fn test_search_server_error_becomes_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search");
            then.status(503);
        });

        let client = client_for(&server);
        let err = client.search(&["Woman casual".to_string()]).await.unwrap_err();
        assert!(matches!(err, StyleCastError::Api { .. }));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let config = PhotosConfig {
            api_key: None,
            ..PhotosConfig::default()
        };
        let client = PhotoClient::new(config).unwrap();
        let err = client.search(&["Woman casual".to_string()]).await.unwrap_err();
        assert!(matches!(err, StyleCastError::Config { .. }));
    }
}
