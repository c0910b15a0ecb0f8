//! `reqwest` implementation of [`Backend`].

use std::sync::Arc;

use qkart_core::{CartEntry, Credentials, Product, ProductId};
use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use super::cache::{CacheKey, CatalogCache, catalog_cache};
use super::types::{AuthResponse, CartUpdate, ErrorBody, RegisterResponse};
use super::{ApiError, Backend};
use crate::config::StorefrontConfig;

/// Maximum number of body characters echoed into logs.
const LOGGED_BODY_CHARS: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the QKart REST API.
///
/// Cheap to clone; clones share the connection pool and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Option<CatalogCache>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("endpoint", &self.inner.endpoint)
            .field("catalog_cache", &self.inner.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("qkart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                endpoint: config.endpoint().to_string(),
                cache: config.catalog_cache_ttl.map(catalog_cache),
            }),
        })
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.endpoint)
    }

    /// Send a request and decode a JSON success body.
    ///
    /// Non-success statuses become [`ApiError::Status`], carrying the
    /// backend's `message` when the body is a JSON error object.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await.map_err(transport_error)?;

        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            debug!(
                status = %status,
                message = ?message,
                "QKart API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(LOGGED_BODY_CHARS).collect::<String>(),
                "Failed to parse QKart API response"
            );
            let err = ApiError::Parse(e);
            crate::error::capture_api_error(&err);
            err
        })
    }

    /// Invalidate the cached catalog, if caching is enabled.
    pub async fn invalidate_catalog(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate(&CacheKey::Catalog).await;
        }
    }
}

/// Convert a reqwest failure and report it to Sentry.
fn transport_error(e: reqwest::Error) -> ApiError {
    let err = ApiError::from(e);
    crate::error::capture_api_error(&err);
    err
}

// =============================================================================
// Backend Methods
// =============================================================================

impl Backend for ApiClient {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(cache) = &self.inner.cache
            && let Some(products) = cache.get(&CacheKey::Catalog).await
        {
            debug!("Cache hit for catalog");
            return Ok(products.as_ref().clone());
        }

        let products: Vec<Product> = self
            .send(self.inner.client.get(self.url("/products")))
            .await?;

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(CacheKey::Catalog, Arc::new(products.clone()))
                .await;
        }

        debug!(count = products.len(), "Fetched catalog");
        Ok(products)
    }

    #[instrument(skip(self))]
    async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let url = format!(
            "{}?value={}",
            self.url("/products/search"),
            urlencoding::encode(text)
        );
        self.send(self.inner.client.get(url)).await
    }

    #[instrument(skip(self, token))]
    async fn fetch_cart(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        self.send(
            self.inner
                .client
                .get(self.url("/cart"))
                .bearer_auth(token.expose_secret()),
        )
        .await
    }

    #[instrument(skip(self, token, product_id), fields(product_id = %product_id))]
    async fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        qty: u32,
    ) -> Result<Vec<CartEntry>, ApiError> {
        self.send(
            self.inner
                .client
                .post(self.url("/cart"))
                .bearer_auth(token.expose_secret())
                .json(&CartUpdate { product_id, qty }),
        )
        .await
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.send(
            self.inner
                .client
                .post(self.url("/auth/login"))
                .json(credentials),
        )
        .await
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username()))]
    async fn register(&self, credentials: &Credentials) -> Result<(), ApiError> {
        let _: RegisterResponse = self
            .send(
                self.inner
                    .client
                    .post(self.url("/auth/register"))
                    .json(credentials),
            )
            .await?;
        Ok(())
    }
}
