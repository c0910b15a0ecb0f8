//! QKart Core - Shared types library.
//!
//! This crate provides the domain types used across all QKart components:
//! - `storefront` - Client library (API client, views, session)
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Cart reconciliation lives here because it is a pure join of two
//! backend responses.
//!
//! # Modules
//!
//! - [`types`] - Product and cart models, type-safe IDs, costs, credentials

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
