//! QKart REST API client.
//!
//! # Architecture
//!
//! - `reqwest` for HTTP, JSON bodies via `serde`
//! - The backend is the source of truth - products, carts and users are
//!   never persisted locally
//! - Optional in-memory caching of the catalog via `moka`
//!
//! # Endpoints
//!
//! | Method | Path | Auth |
//! |---|---|---|
//! | GET | `/products` | none |
//! | GET | `/products/search?value=<text>` | none |
//! | GET | `/cart` | bearer |
//! | POST | `/cart` | bearer |
//! | POST | `/auth/login` | none |
//! | POST | `/auth/register` | none |
//!
//! # Example
//!
//! ```rust,ignore
//! use qkart_storefront::api::{ApiClient, Backend};
//!
//! let client = ApiClient::new(&config)?;
//! let products = client.list_products().await?;
//! let cart = client.update_cart(&token, &products[0].id, 1).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{AuthResponse, ErrorBody};

use std::future::Future;

use qkart_core::{CartEntry, Credentials, Product, ProductId};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur when talking to the QKart backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response reached the client (connection refused, DNS, TLS,
    /// body read interrupted).
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("HTTP {status} {status_text}: {}", .message.as_deref().unwrap_or("(no message)"))]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
        /// `message` field of the backend's error body, if it sent one.
        message: Option<String>,
    },

    /// A success response whose body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether the backend answered 404.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }

    /// The backend's own error message, when the failure carried one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Whether a structured response reached the client.
    #[must_use]
    pub const fn has_response(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Operations the storefront needs from the backend.
///
/// [`ApiClient`] is the production implementation; views are generic over
/// this trait so they can be driven by an in-memory backend in tests.
pub trait Backend: Clone + Send + Sync + 'static {
    /// Fetch the full catalog.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Server-side search. A 404 means "no match".
    fn search_products(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    /// Fetch the cart of the user owning `token`.
    fn fetch_cart(
        &self,
        token: &SecretString,
    ) -> impl Future<Output = Result<Vec<CartEntry>, ApiError>> + Send;

    /// Set the quantity of a product in the cart; returns the updated cart.
    fn update_cart(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        qty: u32,
    ) -> impl Future<Output = Result<Vec<CartEntry>, ApiError>> + Send;

    /// Exchange credentials for a session token.
    fn login(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ApiError>> + Send;

    /// Create a new account.
    fn register(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
