//! Core types for QKart.
//!
//! This module provides type-safe wrappers for the storefront's domain
//! concepts.

pub mod cart;
pub mod credential;
pub mod id;
pub mod price;
pub mod product;

pub use cart::{CartEntry, CartItem, CartTotals, generate_cart_items, is_item_in_cart};
pub use credential::{CredentialError, Credentials, Username};
pub use id::*;
pub use price::Cost;
pub use product::Product;
