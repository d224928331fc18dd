//! Payment provider hand-off.

use shop_shop_core::CheckoutSessionId;
use tracing::info;
use url::Url;

/// Sends the shopper to the payment provider for a session.
pub trait PaymentRedirect: Send + Sync {
    /// Redirect to the payment page for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] if no payment URL can be built for the session.
    fn redirect(&self, session: &CheckoutSessionId) -> Result<Url, url::ParseError>;
}

/// Builds `<base>/<session>` links and logs them for the shopper to follow.
#[derive(Debug, Clone)]
pub struct CheckoutLinkRedirect {
    base: Url,
}

impl CheckoutLinkRedirect {
    /// Create a redirect rooted at `base`.
    #[must_use]
    pub const fn new(base: Url) -> Self {
        Self { base }
    }

    /// Payment page for `session`.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] if the session ID does not form a valid path.
    pub fn checkout_url(&self, session: &CheckoutSessionId) -> Result<Url, url::ParseError> {
        let mut base = self.base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(session.as_str())
    }
}

impl PaymentRedirect for CheckoutLinkRedirect {
    fn redirect(&self, session: &CheckoutSessionId) -> Result<Url, url::ParseError> {
        let url = self.checkout_url(session)?;
        info!(session = %session, url = %url, "Redirecting to payment");
        Ok(url)
    }
}
