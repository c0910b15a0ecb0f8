//! Request and response bodies that only exist on the wire.
//!
//! Catalog and cart payloads reuse the `qkart_core` models directly.

use core::fmt;

use qkart_core::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error body returned by the backend on failure.
///
/// ```json
/// { "success": false, "message": "Product doesn't exist" }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, Serialize)]
pub struct CartUpdate<'a> {
    #[serde(rename = "productId")]
    pub product_id: &'a ProductId,
    pub qty: u32,
}

/// Successful `POST /auth/login` response.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub username: String,
    #[serde(default)]
    pub balance: Option<Decimal>,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("success", &self.success)
            .field("token", &"[REDACTED]")
            .field("username", &self.username)
            .field("balance", &self.balance)
            .finish()
    }
}

/// Successful `POST /auth/register` response.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
}
