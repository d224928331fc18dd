//! Submitted order type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{OrderId, ProductId};

/// A product as echoed back by the order mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Ordered product.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// Product name, when selected.
    #[serde(default)]
    pub name: String,
}

/// An order accepted by the remote source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order ID.
    #[serde(rename = "_id")]
    pub id: OrderId,
    /// When the order was recorded.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub purchase_date: Option<DateTime<Utc>>,
    /// Ordered products, one entry per unit.
    pub products: Vec<OrderItem>,
}

/// Accepts RFC 3339 strings or epoch milliseconds (as number or string).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    let Some(raw) = Option::<Raw>::deserialize(deserializer)? else {
        return Ok(None);
    };

    let millis = match raw {
        Raw::Millis(ms) => ms,
        Raw::Text(text) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(&text) {
                return Ok(Some(dt.with_timezone(&Utc)));
            }
            text.parse::<i64>().map_err(serde::de::Error::custom)?
        }
    };

    DateTime::from_timestamp_millis(millis)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {millis}")))
}
