//! Cart line item types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use miss_gypsy_core::{LineItemId, Variant};

/// One row in the cart: a product in a chosen variant and its quantity.
///
/// The JSON shape matches the snapshot the browser app keeps in local
/// storage, so existing carts restore as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub id: LineItemId,
    pub name: String,
    /// Unit price. Stored as a JSON number, so precision past roughly 15
    /// significant digits is lost when the snapshot is read back; prices
    /// with two decimal places round-trip exactly.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub variant: Variant,
    pub quantity: u32,
    /// Per-item stock limit. `None` falls back to the store default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl CartLineItem {
    /// Price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Input for [`CartStore::add_item`](super::CartStore::add_item).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub id: LineItemId,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    pub variant: Variant,
    pub stock: Option<u32>,
}

impl NewLineItem {
    pub(crate) fn into_line_item(self) -> CartLineItem {
        CartLineItem {
            id: self.id,
            name: self.name,
            price: self.price,
            image: self.image,
            variant: self.variant,
            quantity: 1,
            stock: self.stock,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_deserialize_browser_snapshot_row() {
        let json = r#"{
            "id": "Lotus Ring-0",
            "name": "Lotus Ring",
            "price": 1299.5,
            "image": "https://cdn.example.com/lotus.jpg",
            "variant": {"size": "M", "color": "Silver"},
            "quantity": 2
        }"#;

        let item: CartLineItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.id.as_str(), "Lotus Ring-0");
        assert_eq!(item.price, Decimal::new(12995, 1));
        assert_eq!(item.variant, Variant::new("M", "Silver"));
        assert_eq!(item.stock, None);
        assert_eq!(item.line_total(), Decimal::new(2599, 0));
    }

    #[test]
    fn test_missing_variant_defaults() {
        let json = r#"{"id":"a","name":"A","price":10,"quantity":1}"#;
        let item: CartLineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.variant, Variant::default());
        assert_eq!(item.image, "");
    }

    #[test]
    fn test_stock_omitted_when_absent() {
        let item = NewLineItem {
            id: LineItemId::new("sku-1"),
            name: "Anklet".to_string(),
            price: Decimal::new(500, 0),
            image: String::new(),
            variant: Variant::default(),
            stock: None,
        }
        .into_line_item();

        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("stock"));
        assert!(json.contains("\"price\":500.0"));
    }

    #[test]
    fn test_shop_prices_survive_snapshot() {
        for price in [
            Decimal::new(129_999, 2),
            Decimal::new(10, 2),
            Decimal::new(4995, 1),
        ] {
            let item = NewLineItem {
                id: LineItemId::new("sku-1"),
                name: "Anklet".to_string(),
                price,
                image: String::new(),
                variant: Variant::default(),
                stock: None,
            }
            .into_line_item();

            let json = serde_json::to_string(&item).unwrap();
            let restored: CartLineItem = serde_json::from_str(&json).unwrap();

            assert_eq!(restored.price, price);
        }
    }
}
