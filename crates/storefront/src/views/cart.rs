//! Cart panel state.

use std::sync::Arc;

use qkart_core::{CartItem, CartTotals, ProductId, is_item_in_cart};
use tokio::sync::watch;

/// Reconciled cart lines for the logged-in user.
///
/// Cheap to clone; clones observe the same cart.
#[derive(Debug, Clone)]
pub struct CartView {
    items: Arc<watch::Sender<Vec<CartItem>>>,
}

impl Default for CartView {
    fn default() -> Self {
        Self::new()
    }
}

impl CartView {
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Arc::new(watch::channel(Vec::new()).0),
        }
    }

    /// Current cart lines, in backend order.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.items.borrow().clone()
    }

    pub(crate) fn replace(&self, items: Vec<CartItem>) {
        self.items.send_replace(items);
    }

    #[must_use]
    pub fn contains(&self, product_id: &ProductId) -> bool {
        is_item_in_cart(&self.items.borrow(), product_id)
    }

    /// Quantity of `product_id` in the cart, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.items
            .borrow()
            .iter()
            .find(|item| item.product_id() == product_id)
            .map(|item| item.quantity)
    }

    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::of(&self.items.borrow())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Receiver that observes every change to the cart lines.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<CartItem>> {
        self.items.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use qkart_core::{CartEntry, Cost, generate_cart_items};

    use super::*;
    use crate::testing::catalog;

    fn cart() -> CartView {
        let cart = CartView::new();
        cart.replace(generate_cart_items(
            &[CartEntry::new("A", 2), CartEntry::new("B", 1)],
            &catalog(),
        ));
        cart
    }

    #[test]
    fn test_empty_cart() {
        let cart = CartView::new();
        assert!(cart.is_empty());
        assert_eq!(cart.totals(), CartTotals::default());
    }

    #[test]
    fn test_lookup_and_totals() {
        let cart = cart();
        assert!(cart.contains(&ProductId::new("A")));
        assert!(!cart.contains(&ProductId::new("C")));
        assert_eq!(cart.quantity_of(&ProductId::new("A")), Some(2));
        assert_eq!(cart.quantity_of(&ProductId::new("C")), None);

        let totals = cart.totals();
        assert_eq!(totals.value, Cost::from(360));
        assert_eq!(totals.items, 3);
    }

    #[test]
    fn test_clones_share_state() {
        let cart = cart();
        let other = cart.clone();
        let mut rx = other.subscribe();

        cart.replace(Vec::new());

        assert!(other.is_empty());
        assert!(rx.has_changed().unwrap_or_default());
    }
}
