//! Storefront views as observable state.
//!
//! Each view owns its state in a `tokio::sync::watch` channel. Actions
//! call the backend, write the outcome into the channel, and report
//! anything the user should see through the injected
//! [`Notifier`](crate::notify::Notifier). Front ends render by subscribing.
//!
//! - [`catalog`] - product list, debounced search
//! - [`cart`] - reconciled cart lines and totals
//! - [`products`] - the products page: composes catalog and cart, gates
//!   cart mutations and checkout on the session
//! - [`auth`] - login, registration, logout

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod products;

pub use auth::{LoginPage, RegisterPage, logout};
pub use cart::CartView;
pub use catalog::{CatalogState, CatalogView};
pub use products::{AddToCartOptions, AddToCartOutcome, CheckoutOutcome, ProductsPage};

use crate::api::ApiError;

/// Notification texts.
pub mod messages {
    pub const LOGIN_TO_ADD: &str = "Login to add an item to the cart";
    pub const LOGIN_TO_CHECKOUT: &str = "Login to proceed to checkout";
    pub const ALREADY_IN_CART: &str =
        "Item already in cart. Use the cart sidebar to update quantity or remove item.";
    pub const CART_EMPTY: &str = "Cart is empty. Add more items to the cart to checkout.";
    pub const BACKEND_UNREACHABLE: &str = "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON.";
    pub const AUTH_UNREACHABLE: &str = "Something went wrong. Check that the backend is running, reachable and returns valid JSON.";
    pub const LOGGED_IN: &str = "Logged in successfully";
    pub const REGISTERED: &str = "Registered successfully";
    pub const LOGGED_OUT: &str = "Logged out";
}

/// Text for a failed cart or auth call: the backend's own message, or
/// `fallback` when no structured answer reached the client.
fn failure_message(err: &ApiError, fallback: &str) -> String {
    err.server_message().unwrap_or(fallback).to_string()
}

/// Text for a failed catalog fetch: the status text of a backend answer,
/// or the error itself.
fn catalog_failure_message(err: &ApiError) -> String {
    match err {
        ApiError::Status {
            status,
            status_text,
            ..
        } => {
            if status_text.is_empty() {
                format!("HTTP {status}")
            } else {
                status_text.clone()
            }
        }
        ApiError::Transport(message) => message.clone(),
        ApiError::Parse(_) => err.to_string(),
    }
}
