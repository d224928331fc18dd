//! Core types for Shop Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod order;
pub mod price;

pub use cart::CartLine;
pub use catalog::{Category, CategoryRef, Product};
pub use id::*;
pub use order::{Order, OrderItem};
pub use price::{Price, PriceError};
