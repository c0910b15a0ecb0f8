//! QKart storefront client library.
//!
//! Talks to the QKart REST backend and exposes the storefront's pages as
//! observable state, so that any front end (the `qkart` CLI, a TUI, tests)
//! can drive them.
//!
//! - [`api`] - HTTP client and the [`Backend`](api::Backend) seam
//! - [`session`] - login context and its persistent store
//! - [`views`] - catalog, search, cart and auth pages
//! - [`debounce`] - trailing-edge debounce used by search

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod debounce;
pub mod error;
pub mod navigation;
pub mod notify;
pub mod session;
pub mod views;

#[cfg(test)]
mod testing;
