//! Cart records and their reconciliation against the catalog.
//!
//! The backend stores a cart as a sparse list of `{productId, qty}` pairs.
//! [`generate_cart_items`] joins that list with the product catalog to
//! produce renderable [`CartItem`]s.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Cost;
use super::product::Product;

/// Server-side cart record: a product reference and a count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Referenced product.
    #[serde(rename = "productId")]
    pub product_id: ProductId,
    /// Desired quantity.
    #[serde(rename = "qty")]
    pub quantity: u32,
}

impl CartEntry {
    /// Create a new cart entry.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Client-side cart line: a full product paired with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    /// The product, taken from the catalog snapshot.
    pub product: Product,
    /// Quantity in the cart.
    pub quantity: u32,
}

impl CartItem {
    /// ID of the product on this line.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Cost of the whole line.
    #[must_use]
    pub fn line_cost(&self) -> Cost {
        self.product.cost.times(self.quantity)
    }
}

/// Join cart entries against the catalog.
///
/// Output order follows `entries`. Entries whose product ID is absent from
/// `catalog` are dropped without error. If the catalog lists an ID twice,
/// the first product wins.
#[must_use]
pub fn generate_cart_items(entries: &[CartEntry], catalog: &[Product]) -> Vec<CartItem> {
    let mut by_id: HashMap<&ProductId, &Product> = HashMap::with_capacity(catalog.len());
    for product in catalog {
        by_id.entry(&product.id).or_insert(product);
    }

    entries
        .iter()
        .filter_map(|entry| {
            by_id.get(&entry.product_id).map(|product| CartItem {
                product: (*product).clone(),
                quantity: entry.quantity,
            })
        })
        .collect()
}

/// Whether a product is already present among the cart items.
#[must_use]
pub fn is_item_in_cart(items: &[CartItem], product_id: &ProductId) -> bool {
    items.iter().any(|item| item.product_id() == product_id)
}

/// Aggregates shown at the bottom of the cart panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CartTotals {
    /// Sum of `cost * quantity` over all lines.
    pub value: Cost,
    /// Sum of quantities over all lines.
    pub items: u32,
}

impl CartTotals {
    /// Compute totals for a list of cart items.
    #[must_use]
    pub fn of(items: &[CartItem]) -> Self {
        Self {
            value: items.iter().map(CartItem::line_cost).sum(),
            items: items.iter().map(|item| item.quantity).sum(),
        }
    }
}
