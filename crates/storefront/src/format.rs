//! Display helpers shared by the views.

use rust_decimal::Decimal;
use shop_shop_core::Price;

/// Format an amount as a dollar price string.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Format a [`Price`] as a dollar price string.
#[must_use]
pub fn format_price(price: Price) -> String {
    format_amount(price.amount())
}

/// `name` for a count of one, `name` + "s" otherwise.
#[must_use]
pub fn pluralize(name: &str, count: u64) -> String {
    if count == 1 {
        name.to_string()
    } else {
        format!("{name}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Price::from_cents(299)), "$2.99");
        assert_eq!(format_price(Price::ZERO), "$0.00");
        assert_eq!(format_amount(Decimal::new(12_345, 3)), "$12.35");
        assert_eq!(format_amount(Decimal::from(7)), "$7.00");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("item", 1), "item");
        assert_eq!(pluralize("item", 0), "items");
        assert_eq!(pluralize("item", 3), "items");
    }
}
