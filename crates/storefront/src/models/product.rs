//! Catalog product records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use miss_gypsy_core::{LineItemId, Price, Variant};

use crate::cart::NewLineItem;

/// A product as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Units available. Absent for most catalog entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl Product {
    /// Price in the storefront currency.
    #[must_use]
    pub fn display_price(&self) -> Price {
        Price::inr(self.price)
    }

    /// Cart input for this product in the chosen variant.
    #[must_use]
    pub fn line_item(&self, variant: Variant) -> NewLineItem {
        NewLineItem {
            id: LineItemId::for_product(&self.name, &variant),
            name: self.name.clone(),
            price: self.price,
            image: self.image_url.clone(),
            variant,
            stock: self.stock,
        }
    }
}
