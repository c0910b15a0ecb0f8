//! Cache types for catalog responses.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use qkart_core::Product;

/// Cache key for catalog responses.
///
/// Search results and carts are never cached.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Catalog,
}

/// Read-through cache of `GET /products`.
pub type CatalogCache = Cache<CacheKey, Arc<Vec<Product>>>;

/// Build a catalog cache with the given time-to-live.
pub fn catalog_cache(ttl: Duration) -> CatalogCache {
    Cache::builder().max_capacity(1).time_to_live(ttl).build()
}
