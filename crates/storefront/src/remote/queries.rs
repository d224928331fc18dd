//! GraphQL documents and response shapes used by [`super::HttpRemote`].

use serde::Deserialize;
use shop_shop_core::{Category, CheckoutSessionId, Order, Product};

/// Every product with its category reference.
pub const QUERY_PRODUCTS: &str = r"
query getProducts($category: ID) {
  products(category: $category) {
    _id
    name
    description
    price
    quantity
    image
    category {
      _id
    }
  }
}
";

/// Every category.
pub const QUERY_CATEGORIES: &str = r"
{
  categories {
    _id
    name
  }
}
";

/// Record an order for a list of product IDs.
pub const ADD_ORDER: &str = r"
mutation addOrder($products: [ID]!) {
  addOrder(products: $products) {
    _id
    purchaseDate
    products {
      _id
      name
    }
  }
}
";

/// Start a payment session for a list of product IDs.
pub const QUERY_CHECKOUT: &str = r"
query getCheckout($products: [ID]!) {
  checkout(products: $products) {
    session
  }
}
";

#[derive(Debug, Deserialize)]
pub struct ProductsData {
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesData {
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub struct AddOrderData {
    #[serde(rename = "addOrder")]
    pub add_order: Order,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutData {
    pub checkout: CheckoutSession,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub session: CheckoutSessionId,
}
