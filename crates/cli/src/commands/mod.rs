//! Command implementations.
//!
//! Commands write their results to the given writer and log everything else.

pub mod cart;
pub mod catalog;
pub mod order;

use shop_shop_storefront::error::AppError;
use thiserror::Error;

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CommandError {
    /// Message for the shopper.
    pub fn user_message(&self) -> String {
        match self {
            Self::App(e) => e.user_message(),
            Self::Io(e) => e.to_string(),
        }
    }

    /// `true` when the shopper can fix the problem themselves.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::App(e) if e.is_user_error())
    }
}
