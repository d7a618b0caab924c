use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::config::Config;

mod auth;
mod cache;
mod envelope;
mod error;
mod resources;
mod retry;

pub use auth::{LoginRequest, RegisterRequest, ResetPasswordRequest};
pub use cache::{CacheStats, ResponseCache};
pub use envelope::ApiResponse;
pub use error::{find_api_error, ApiError};
pub use retry::RetryConfig;

/// API client for communicating with the FitTrack backend.
///
/// Cloning is cheap; clones share the HTTP connection pool, the session
/// token and the response cache.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    retry_config: RetryConfig,
    cache: Arc<ResponseCache>,
}

impl ApiClient {
    /// Create a new API client from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let cache = Arc::new(ResponseCache::new(Duration::from_secs(
            config.cache.ttl_seconds,
        )));
        Self::with_parts(config, RetryConfig::from(&config.retry), cache)
    }

    /// Create a client with an explicit retry policy and a shared cache
    pub fn with_parts(
        config: &Config,
        retry_config: RetryConfig,
        cache: Arc<ResponseCache>,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(config.api.timeout_seconds);
        let base_url = config.api.base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: Arc::new(RwLock::new(None)),
            retry_config,
            cache,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    /// Replace the bearer token used for subsequent requests
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    pub async fn token(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    /// GET a JSON payload. With a `cache_key`, a fresh cached value is
    /// returned without touching the network and a fetched value is cached.
    pub async fn get<T>(&self, path: &str, cache_key: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned + Serialize,
    {
        if let Some(key) = cache_key {
            if let Some(cached) = self.cache.get::<T>(key) {
                return Ok(cached);
            }
        }

        let value: T = self.request(Method::GET, path, &[], None).await?;

        if let Some(key) = cache_key {
            self.cache.insert(key, &value);
        }

        Ok(value)
    }

    /// GET with query parameters (never cached)
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        self.request(Method::PUT, path, &[], Some(body)).await
    }

    pub async fn patch<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let body = serde_json::to_value(body).context("Failed to serialize request body")?;
        self.request(Method::PATCH, path, &[], Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, &[], None).await
    }

    /// Check whether `url` answers a HEAD request with a success status.
    /// Used to pick a playable video source.
    pub async fn check_reachable(&self, url: &str) -> Result<()> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::from_status(status, String::new()).into())
        }
    }

    /// Send one request through the retry policy and unwrap the envelope
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let token = self.token().await;

        tracing::debug!("{} {}", method, url);

        self.retry_config
            .execute(|| async {
                let mut builder = self.client.request(method.clone(), &url);

                if !query.is_empty() {
                    builder = builder.query(query);
                }
                if let Some(ref token) = token {
                    builder = builder.bearer_auth(token);
                }
                if let Some(ref body) = body {
                    builder = builder.json(body);
                }

                let response = builder
                    .send()
                    .await
                    .map_err(|e| ApiError::from_reqwest(&e))?;

                let status = response.status();

                if status.is_success() {
                    let envelope: ApiResponse<T> = response
                        .json()
                        .await
                        .map_err(|e| ApiError::Decode(e.to_string()))?;
                    Ok(envelope.into_data()?)
                } else {
                    let error_text = response.text().await.unwrap_or_default();
                    let error = ApiError::from_status(status, error_text);
                    tracing::debug!("{} {} failed: {}", method, url, error);
                    Err(error.into())
                }
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_creation() {
        let config = Config::default();
        let client = ApiClient::new(&config);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_base_url_is_normalized() {
        let mut config = Config::default();
        config.api.base_url = "http://localhost:3000/".to_string();
        let client = ApiClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert!(!client.has_token().await);

        client.set_token(Some("abc".to_string())).await;
        assert_eq!(client.token().await.as_deref(), Some("abc"));
    }
}
