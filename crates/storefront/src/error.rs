//! Unified error handling.
//!
//! Provides a unified `AppError` type for every operation a view exposes.
//! The process entry point logs the full error and shows the shopper
//! [`AppError::user_message`].

use thiserror::Error;

use crate::cache::StorageFault;
use crate::config::ConfigError;
use crate::remote::RemoteFault;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Durable cache operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageFault),

    /// Remote call failed.
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteFault),

    /// Configuration is invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Payment link could not be built.
    #[error("Payment redirect error: {0}")]
    Payment(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Checkout requires a logged-in shopper.
    #[error("Not logged in")]
    NotLoggedIn,

    /// Checkout requires at least one cart line.
    #[error("Cart is empty")]
    EmptyCart,
}

impl AppError {
    /// Message safe to show the shopper. Internal details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storage(_) => "Local storage error".to_string(),
            Self::Remote(RemoteFault::Unauthorized) | Self::NotLoggedIn => {
                "(log in to check out)".to_string()
            }
            Self::Remote(_) => "The shop is unreachable, please try again later".to_string(),
            Self::Payment(_) => "Could not start payment".to_string(),
            Self::Config(_) | Self::NotFound(_) | Self::EmptyCart => self.to_string(),
        }
    }

    /// `true` for errors caused by the shopper rather than the system.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::NotLoggedIn | Self::EmptyCart)
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
