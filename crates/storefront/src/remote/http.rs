//! GraphQL-over-HTTP remote.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use shop_shop_core::{Category, CheckoutSessionId, Order, Product, ProductId};
use tracing::{debug, instrument};
use url::Url;

use super::queries::{
    ADD_ORDER, AddOrderData, CategoriesData, CheckoutData, ProductsData, QUERY_CATEGORIES,
    QUERY_CHECKOUT, QUERY_PRODUCTS,
};
use super::{RemoteFault, RemoteSource};

/// Client for the shop's GraphQL API.
#[derive(Clone)]
pub struct HttpRemote {
    inner: Arc<HttpRemoteInner>,
}

struct HttpRemoteInner {
    client: reqwest::Client,
    endpoint: Url,
    auth_token: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

impl HttpRemote {
    /// Create a client posting to `endpoint`. The token, when present, is
    /// sent as a bearer credential on every request.
    #[must_use]
    pub fn new(endpoint: Url, auth_token: Option<SecretString>) -> Self {
        Self {
            inner: Arc::new(HttpRemoteInner {
                client: reqwest::Client::new(),
                endpoint,
                auth_token,
            }),
        }
    }

    /// GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, RemoteFault> {
        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }));

        if let Some(token) = &self.inner.auth_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(RemoteFault::Unauthorized);
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Remote returned non-success status"
            );
            return Err(RemoteFault::Unavailable(format!("HTTP {status}")));
        }

        decode_response(&body)
    }
}

/// Decode a GraphQL response body into its `data` payload.
///
/// Errors win over partial data.
pub(crate) fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, RemoteFault> {
    let response: GraphQLResponse<T> = serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse GraphQL response"
        );
        RemoteFault::Parse(e)
    })?;

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        debug!(errors = ?errors, "GraphQL errors in response");
        return Err(RemoteFault::GraphQL(
            errors.into_iter().map(|e| e.message).collect(),
        ));
    }

    response
        .data
        .ok_or_else(|| RemoteFault::Unavailable("response carried no data".to_string()))
}

impl RemoteSource for HttpRemote {
    #[instrument(skip(self))]
    async fn fetch_categories(&self) -> Result<Vec<Category>, RemoteFault> {
        let data: CategoriesData = self.execute(QUERY_CATEGORIES, json!({})).await?;
        debug!(count = data.categories.len(), "Fetched categories");
        Ok(data.categories)
    }

    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, RemoteFault> {
        let data: ProductsData = self.execute(QUERY_PRODUCTS, json!({})).await?;
        debug!(count = data.products.len(), "Fetched products");
        Ok(data.products)
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn submit_order(&self, products: &[ProductId]) -> Result<Order, RemoteFault> {
        let data: AddOrderData = self
            .execute(ADD_ORDER, json!({ "products": products }))
            .await?;
        Ok(data.add_order)
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn create_checkout_session(
        &self,
        products: &[ProductId],
    ) -> Result<CheckoutSessionId, RemoteFault> {
        let data: CheckoutData = self
            .execute(QUERY_CHECKOUT, json!({ "products": products }))
            .await?;
        Ok(data.checkout.session)
    }
}
