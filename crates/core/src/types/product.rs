//! Catalog product as served by the backend.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Cost;

/// A purchasable product.
///
/// Immutable from the client's perspective. Field names on the wire follow
/// the backend (`_id`, `image`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Category the product belongs to.
    pub category: String,
    /// Unit price.
    pub cost: Cost,
    /// Aggregate rating, integer out of five.
    pub rating: u8,
    /// Product image URL.
    #[serde(rename = "image")]
    pub image_url: String,
}
