//! Integration tests for cart persistence.
//!
//! These tests open real `FileStorage` directories and verify that a cart
//! written by one store instance is restored by the next.
#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use miss_gypsy_core::{LineItemId, Variant};
use miss_gypsy_storefront::cart::{
    CartSettings, CartStorage, CartStore, FileStorage, NewLineItem, UpdateOutcome,
};

fn ring(variant: Variant) -> NewLineItem {
    NewLineItem {
        id: LineItemId::for_product("Moon Ring", &variant),
        name: "Moon Ring".to_string(),
        price: Decimal::from(1499),
        image: "https://cdn.example.com/moon-ring.jpg".to_string(),
        variant,
        stock: Some(5),
    }
}

fn open(dir: &tempfile::TempDir) -> CartStore {
    CartStore::open(
        Arc::new(FileStorage::new(dir.path())),
        CartSettings::default(),
    )
}

// =============================================================================
// Restore
// =============================================================================

#[test]
fn test_cart_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let mut cart = open(&dir);
    cart.add_item(ring(Variant::default())).unwrap();
    cart.add_item(ring(Variant::new("M", "Silver"))).unwrap();
    cart.update_quantity(&LineItemId::new("moon-ring-m-silver"), 3);
    let expected = cart.items().to_vec();
    cart.close();

    let reopened = open(&dir);

    assert_eq!(reopened.items(), expected.as_slice());
    assert_eq!(reopened.item_count(), 4);
    assert_eq!(reopened.total(), Decimal::from(1499 * 4));
}

#[test]
fn test_malformed_snapshot_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("cart.json"), "{not json").unwrap();

    let cart = open(&dir);

    assert!(cart.is_empty());
    assert_eq!(cart.total(), Decimal::ZERO);
}

#[test]
fn test_browser_snapshot_loads() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("cart.json"),
        r#"[{"id":"hoops-0","name":"Hoops","price":500,"image":"","quantity":2}]"#,
    )
    .unwrap();

    let cart = open(&dir);

    assert_eq!(cart.len(), 1);
    assert_eq!(cart.total(), Decimal::from(1000));
}

#[test]
fn test_restored_quantity_is_reclamped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("cart.json"),
        r#"[{"id":"chain","name":"Chain","price":250,"quantity":9,"stock":4}]"#,
    )
    .unwrap();

    let mut cart = open(&dir);

    assert_eq!(cart.items()[0].quantity, 4);
    assert_eq!(
        cart.update_quantity(&LineItemId::new("chain"), 6),
        UpdateOutcome::Clamped {
            requested: 6,
            limit: 4,
            quantity: 4
        }
    );
}

// =============================================================================
// Debounced writes
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_write_lands_after_quiet_period() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let mut cart = open(&dir);

    cart.add_item(ring(Variant::default())).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    cart.add_item(ring(Variant::default())).unwrap();

    // 400ms after the second mutation: still inside its quiet period
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(storage.load("cart").unwrap(), None);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let saved = storage.load("cart").unwrap().unwrap();
    assert_eq!(saved, cart.snapshot_json().unwrap());
    assert!(!cart.has_pending_write());
}

#[tokio::test(start_paused = true)]
async fn test_close_flushes_pending_write() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    let mut cart = open(&dir);

    cart.add_item(ring(Variant::default())).unwrap();
    assert!(cart.has_pending_write());
    cart.close();

    let saved = storage.load("cart").unwrap().unwrap();
    let items: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(items[0]["id"], "moon-ring-s-gold");
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_pending_write() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());

    {
        let mut cart = open(&dir);
        cart.add_item(ring(Variant::default())).unwrap();
    }
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(storage.load("cart").unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn test_clear_persists_empty_cart() {
    let dir = tempfile::tempdir().unwrap();
    let mut cart = open(&dir);
    cart.add_item(ring(Variant::default())).unwrap();
    cart.flush();

    cart.clear();
    cart.close();

    assert!(open(&dir).is_empty());
}
