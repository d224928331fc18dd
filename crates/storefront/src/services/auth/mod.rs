//! Login state.

use secrecy::{ExposeSecret, SecretString};

/// Answers whether the current shopper is authenticated.
pub trait AuthGate: Send + Sync {
    /// `true` when checkout may proceed.
    fn is_logged_in(&self) -> bool;
}

/// Logged in iff a non-blank token is configured.
#[derive(Default)]
pub struct TokenAuth {
    token: Option<SecretString>,
}

impl TokenAuth {
    /// Create a gate around an optional token.
    #[must_use]
    pub const fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }
}

impl AuthGate for TokenAuth {
    fn is_logged_in(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().trim().is_empty())
    }
}

impl std::fmt::Debug for TokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAuth")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
