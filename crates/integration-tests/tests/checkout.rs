//! Integration tests for checkout.
//!
//! Builds a cart from catalog products and checks the summary handed to the
//! payment step.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use miss_gypsy_core::Variant;
use miss_gypsy_storefront::cart::{CartSettings, CartStore};
use miss_gypsy_storefront::forms::CheckoutForm;
use miss_gypsy_storefront::models::Product;
use miss_gypsy_storefront::services::checkout::{self, CheckoutError};
use miss_gypsy_storefront::StorefrontError;

fn product(name: &str, price: i64) -> Product {
    Product {
        name: name.to_string(),
        price: Decimal::from(price),
        description: String::new(),
        image_url: String::new(),
        stock: None,
    }
}

fn form() -> CheckoutForm {
    CheckoutForm {
        name: "Asha Rao".to_string(),
        email: "asha.rao@example.in".to_string(),
        address: "221 Linking Road, Bandra, Mumbai".to_string(),
    }
}

#[test]
fn test_checkout_from_catalog_products() {
    let hoops = product("Moon Hoops", 899);
    let pendant = product("Rose Pendant", 1250);
    let mut cart = CartStore::in_memory(CartSettings::default());

    cart.add_item(hoops.line_item(Variant::default())).unwrap();
    cart.add_item(hoops.line_item(Variant::default())).unwrap();
    cart.add_item(pendant.line_item(Variant::new("M", "Rose Gold")))
        .unwrap();

    let summary = checkout::prepare(&cart, &form()).unwrap();

    assert_eq!(summary.details.name, "Asha Rao");
    assert_eq!(summary.items.len(), 2);
    assert_eq!(summary.item_count, 3);
    assert_eq!(summary.total, Decimal::from(899 * 2 + 1250));
    assert_eq!(summary.display_total().to_string(), "₹3048.00");
}

#[test]
fn test_checkout_leaves_cart_intact() {
    let mut cart = CartStore::in_memory(CartSettings::default());
    cart.add_item(product("Moon Hoops", 899).line_item(Variant::default()))
        .unwrap();

    checkout::prepare(&cart, &form()).unwrap();

    assert_eq!(cart.len(), 1);
}

#[test]
fn test_empty_cart_message() {
    let cart = CartStore::in_memory(CartSettings::default());

    let err = StorefrontError::from(checkout::prepare(&cart, &form()).unwrap_err());

    assert!(matches!(
        err,
        StorefrontError::Checkout(CheckoutError::EmptyCart)
    ));
    assert_eq!(err.user_message(), "Your cart is empty");
}
