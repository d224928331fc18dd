//! Shop Shop storefront library.
//!
//! An offline-capable shopping cart engine: a serialized store driven by a
//! pure reducer, a durable `SQLite` cache, and a remote GraphQL catalog, with
//! a three-tier policy deciding which of them a view trusts.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod error;
pub mod format;
pub mod remote;
pub mod services;
pub mod state;
pub mod store;
pub mod sync;
pub mod views;

#[cfg(test)]
mod test_support;
