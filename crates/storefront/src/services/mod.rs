//! Collaborators the cart checkout depends on.
//!
//! # Services
//!
//! - `auth` - whether the shopper is logged in
//! - `payment` - hands a checkout session to the payment provider
//!
//! Both are traits so views can be driven by test doubles.

mod auth;
mod payment;

pub use auth::{AuthGate, TokenAuth};
pub use payment::{CheckoutLinkRedirect, PaymentRedirect};
