//! Shop Shop Core - Shared types library.
//!
//! This crate provides common types used across all Shop Shop components:
//! - `storefront` - Client-side state engine (store, durable cache, sync policy)
//! - `cli` - Command-line entry point driving the storefront views
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, catalog records, and cart lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
