//! Checkout summary built from the cart and the shipping form.
//!
//! Payment is handled elsewhere; this only produces the summary handed to
//! the payment step. The cart is left untouched.

use rust_decimal::Decimal;
use thiserror::Error;

use miss_gypsy_core::Price;

use crate::cart::{CartLineItem, CartStore};
use crate::forms::{CheckoutDetails, CheckoutForm, FieldErrors};

/// Errors from preparing a checkout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// Shipping details failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),
}

impl CheckoutError {
    /// Message safe to show on the checkout page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCart => "Your cart is empty".to_string(),
            Self::Validation(errors) => errors.to_string(),
        }
    }
}

/// Everything the payment step needs.
#[derive(Debug, Clone)]
pub struct CheckoutSummary {
    pub details: CheckoutDetails,
    pub items: Vec<CartLineItem>,
    pub item_count: u64,
    pub total: Decimal,
}

impl CheckoutSummary {
    /// Total in the storefront currency.
    #[must_use]
    pub fn display_total(&self) -> Price {
        Price::inr(self.total)
    }
}

/// Validate the shipping form against a non-empty cart.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if the cart has no items, or
/// `CheckoutError::Validation` if the form is invalid.
pub fn prepare(cart: &CartStore, form: &CheckoutForm) -> Result<CheckoutSummary, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let details = form.validate()?;

    tracing::info!(
        items = cart.len(),
        total = %cart.total(),
        "Checkout prepared"
    );

    Ok(CheckoutSummary {
        details,
        items: cart.items().to_vec(),
        item_count: cart.item_count(),
        total: cart.total(),
    })
}
