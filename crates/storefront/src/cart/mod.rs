//! Cart store: the single source of truth for the shopping cart.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the line items; consumers read through accessors and
//!   mutate only through `add_item`, `remove_item`, `update_quantity` and `clear`
//! - Every mutation broadcasts a [`CartEvent`] and schedules a debounced write
//!   of the full snapshot to a [`CartStorage`] backend
//! - Opening a store restores the last snapshot; a missing or malformed
//!   snapshot yields an empty cart
//!
//! # Example
//!
//! ```rust,ignore
//! use miss_gypsy_storefront::cart::{CartSettings, CartStore, FileStorage};
//!
//! let storage = Arc::new(FileStorage::new(".storefront"));
//! let mut cart = CartStore::open(storage, CartSettings::default());
//!
//! cart.add_item(item)?;
//! cart.update_quantity(&id, 3);
//! println!("total: {}", cart.total());
//!
//! // Normal teardown writes the last snapshot
//! cart.close();
//! ```

mod debounce;
mod events;
mod item;
mod storage;

pub use debounce::PersistDebouncer;
pub use events::CartEvent;
pub use item::{CartLineItem, NewLineItem};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::broadcast;

use miss_gypsy_core::LineItemId;

use crate::error::add_breadcrumb;

/// Capacity of the change notification channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Errors returned by cart mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The item is missing a required field. Nothing was changed.
    #[error("invalid cart item: {0}")]
    InvalidInput(String),
}

/// Result of [`CartStore::add_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line item was appended with quantity 1.
    Added,
    /// The existing line item's quantity was incremented. `capped` is set
    /// when the increment would have exceeded the stock limit.
    Updated { quantity: u32, capped: bool },
}

/// Result of [`CartStore::remove_item`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

/// Result of [`CartStore::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Quantity set (requests below 1 are raised to 1).
    Updated { quantity: u32 },
    /// Request exceeded the stock limit; quantity was capped at `limit`.
    Clamped {
        requested: i64,
        limit: u32,
        quantity: u32,
    },
    /// No line item with that ID.
    NotFound,
}

/// Cart store behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    /// Storage key of the snapshot.
    pub storage_key: String,
    /// Quiet period before a snapshot is written.
    pub persist_debounce: Duration,
    /// Stock limit applied to items that carry none.
    pub default_stock_limit: u32,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            storage_key: "cart".to_string(),
            persist_debounce: Duration::from_millis(500),
            default_stock_limit: 100,
        }
    }
}

/// The shopping cart for one browser session.
///
/// Not shared: the owner passes `&CartStore` to readers and `&mut CartStore`
/// to the handlers that mutate it.
#[derive(Debug)]
pub struct CartStore {
    items: Vec<CartLineItem>,
    settings: CartSettings,
    persist: PersistDebouncer,
    events: broadcast::Sender<CartEvent>,
}

impl CartStore {
    /// Open the cart, restoring the last snapshot from `storage`.
    ///
    /// Never fails: an absent, unreadable or malformed snapshot yields an
    /// empty cart.
    #[must_use]
    pub fn open(storage: Arc<dyn CartStorage>, settings: CartSettings) -> Self {
        let items = restore(storage.as_ref(), &settings);
        let persist = PersistDebouncer::new(
            storage,
            &settings.storage_key,
            settings.persist_debounce,
        );
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        tracing::debug!(
            key = %settings.storage_key,
            items = items.len(),
            "Cart store opened"
        );

        Self {
            items,
            settings,
            persist,
            events,
        }
    }

    /// Open an empty cart backed by in-process storage.
    #[must_use]
    pub fn in_memory(settings: CartSettings) -> Self {
        Self::open(Arc::new(MemoryStorage::new()), settings)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of an item.
    ///
    /// An item already in the cart has its quantity incremented (capped at
    /// its stock limit); otherwise a new line item with quantity 1 is
    /// appended.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidInput` if the item has no ID or a negative
    /// price. The cart is not changed.
    pub fn add_item(&mut self, item: NewLineItem) -> Result<AddOutcome, CartError> {
        if item.id.is_empty() {
            return Err(CartError::InvalidInput("item id is required".to_string()));
        }
        if item.price < Decimal::ZERO {
            return Err(CartError::InvalidInput(format!(
                "price cannot be negative (got {})",
                item.price
            )));
        }

        add_breadcrumb("cart", "Added item to cart", Some(&[("id", item.id.as_str())]));

        let default_limit = self.settings.default_stock_limit;
        let incremented = self
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .map(|existing| {
                let limit = stock_limit(existing.stock, default_limit);
                let requested = existing.quantity.saturating_add(1);
                existing.quantity = requested.min(limit);
                (existing.quantity, requested, limit)
            });

        let outcome = if let Some((quantity, requested, limit)) = incremented {
            let capped = requested > limit;
            self.notify(CartEvent::QuantityChanged {
                id: item.id.clone(),
                quantity,
            });
            if capped {
                tracing::info!(id = %item.id, limit, "Cart quantity capped at stock limit");
                self.notify(CartEvent::LimitExceeded {
                    id: item.id,
                    requested: i64::from(requested),
                    limit,
                });
            }
            AddOutcome::Updated { quantity, capped }
        } else {
            let id = item.id.clone();
            self.items.push(item.into_line_item());
            self.notify(CartEvent::Added { id });
            AddOutcome::Added
        };

        self.schedule_persist();
        Ok(outcome)
    }

    /// Remove a line item. Absent IDs are a no-op.
    pub fn remove_item(&mut self, id: &LineItemId) -> RemoveOutcome {
        let Some(index) = self.items.iter().position(|i| &i.id == id) else {
            tracing::debug!(id = %id, "Remove ignored, item not in cart");
            return RemoveOutcome::NotFound;
        };

        self.items.remove(index);
        add_breadcrumb("cart", "Removed item from cart", Some(&[("id", id.as_str())]));
        self.notify(CartEvent::Removed { id: id.clone() });
        self.schedule_persist();
        RemoveOutcome::Removed
    }

    /// Set a line item's quantity, clamped into `[1, stock limit]`.
    ///
    /// Requests above the limit are applied as the limit and reported as
    /// [`UpdateOutcome::Clamped`]. Absent IDs are a no-op.
    pub fn update_quantity(&mut self, id: &LineItemId, requested: i64) -> UpdateOutcome {
        let default_limit = self.settings.default_stock_limit;
        let Some(item) = self.items.iter_mut().find(|i| &i.id == id) else {
            tracing::debug!(id = %id, "Quantity update ignored, item not in cart");
            return UpdateOutcome::NotFound;
        };

        let limit = stock_limit(item.stock, default_limit);
        let quantity = clamp_quantity(requested, limit);
        item.quantity = quantity;

        self.notify(CartEvent::QuantityChanged {
            id: id.clone(),
            quantity,
        });

        let outcome = if requested > i64::from(limit) {
            tracing::info!(id = %id, requested, limit, "Cart quantity capped at stock limit");
            self.notify(CartEvent::LimitExceeded {
                id: id.clone(),
                requested,
                limit,
            });
            UpdateOutcome::Clamped {
                requested,
                limit,
                quantity,
            }
        } else {
            UpdateOutcome::Updated { quantity }
        };

        self.schedule_persist();
        outcome
    }

    /// Remove every line item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.notify(CartEvent::Cleared);
        self.schedule_persist();
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Look up a line item.
    #[must_use]
    pub fn get(&self, id: &LineItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Number of line items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all line items.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of price times quantity across all line items.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Store settings.
    #[must_use]
    pub const fn settings(&self) -> &CartSettings {
        &self.settings
    }

    /// Serialize the cart the way it is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Subscribe to change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Write any pending snapshot now.
    pub fn flush(&mut self) {
        self.persist.flush();
    }

    /// Whether a snapshot is waiting for the debounce timer.
    #[must_use]
    pub fn has_pending_write(&self) -> bool {
        self.persist.is_pending()
    }

    /// Flush and tear down the store.
    ///
    /// Dropping the store without closing it cancels a pending write.
    pub fn close(mut self) {
        self.persist.flush();
    }

    fn schedule_persist(&mut self) {
        match self.snapshot_json() {
            Ok(snapshot) => self.persist.schedule(snapshot),
            Err(e) => tracing::error!(error = %e, "Failed to serialize cart snapshot"),
        }
    }

    fn notify(&self, event: CartEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

/// Stock limit for an item, never below 1.
fn stock_limit(stock: Option<u32>, default_limit: u32) -> u32 {
    stock.unwrap_or(default_limit).max(1)
}

/// Clamp a requested quantity into `[1, limit]`.
fn clamp_quantity(requested: i64, limit: u32) -> u32 {
    let clamped = requested.clamp(1, i64::from(limit));
    u32::try_from(clamped).unwrap_or(limit)
}

/// Load and sanitize the persisted snapshot.
fn restore(storage: &dyn CartStorage, settings: &CartSettings) -> Vec<CartLineItem> {
    let raw = match storage.load(&settings.storage_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read cart snapshot, starting empty");
            return Vec::new();
        }
    };

    let items: Vec<CartLineItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "Discarding malformed cart snapshot");
            return Vec::new();
        }
    };

    let mut restored: Vec<CartLineItem> = Vec::with_capacity(items.len());
    for mut item in items {
        if item.id.is_empty() || restored.iter().any(|i| i.id == item.id) {
            tracing::warn!(id = %item.id, "Skipping empty or duplicate cart row");
            continue;
        }
        let limit = stock_limit(item.stock, settings.default_stock_limit);
        item.quantity = clamp_quantity(i64::from(item.quantity), limit);
        restored.push(item);
    }
    restored
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use miss_gypsy_core::Variant;

    use super::*;

    fn item(id: &str, price: i64) -> NewLineItem {
        NewLineItem {
            id: LineItemId::new(id),
            name: format!("Item {id}"),
            price: Decimal::from(price),
            image: format!("https://cdn.example.com/{id}.jpg"),
            variant: Variant::default(),
            stock: None,
        }
    }

    fn store() -> CartStore {
        CartStore::in_memory(CartSettings::default())
    }

    #[test]
    fn test_repeated_add_increments_single_row() {
        let mut cart = store();

        assert_eq!(cart.add_item(item("sku-1", 500)).unwrap(), AddOutcome::Added);
        assert_eq!(
            cart.add_item(item("sku-1", 500)).unwrap(),
            AddOutcome::Updated {
                quantity: 2,
                capped: false
            }
        );

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total(), Decimal::from(1000));
    }

    #[test]
    fn test_add_count_matches_quantity() {
        let mut cart = store();
        for _ in 0..7 {
            cart.add_item(item("sku-1", 10)).unwrap();
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(&LineItemId::new("sku-1")).unwrap().quantity, 7);
    }

    #[test]
    fn test_add_without_id_is_rejected() {
        let mut cart = store();

        let result = cart.add_item(item("", 500));

        assert!(matches!(result, Err(CartError::InvalidInput(_))));
        assert!(cart.is_empty());
        assert!(!cart.has_pending_write());
    }

    #[test]
    fn test_add_with_negative_price_is_rejected() {
        let mut cart = store();
        assert!(cart.add_item(item("sku-1", -5)).is_err());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_caps_at_stock() {
        let mut cart = store();
        let mut limited = item("sku-1", 100);
        limited.stock = Some(2);

        cart.add_item(limited.clone()).unwrap();
        cart.add_item(limited.clone()).unwrap();
        let outcome = cart.add_item(limited).unwrap();

        assert_eq!(
            outcome,
            AddOutcome::Updated {
                quantity: 2,
                capped: true
            }
        );
    }

    #[test]
    fn test_remove_then_add_starts_fresh() {
        let mut cart = store();
        let id = LineItemId::new("sku-1");
        cart.add_item(item("sku-1", 5)).unwrap();
        cart.update_quantity(&id, 9);

        assert_eq!(cart.remove_item(&id), RemoveOutcome::Removed);
        assert_eq!(cart.remove_item(&id), RemoveOutcome::NotFound);

        cart.add_item(item("sku-1", 5)).unwrap();
        assert_eq!(cart.get(&id).unwrap().quantity, 1);
    }

    #[test]
    fn test_update_quantity_clamps_into_range() {
        let mut cart = store();
        let id = LineItemId::new("sku-1");
        cart.add_item(item("sku-1", 5)).unwrap();

        for requested in [i64::MIN, -10, 0, 1, 50, 100, 101, i64::MAX] {
            cart.update_quantity(&id, requested);
            let quantity = cart.get(&id).unwrap().quantity;
            assert!((1..=100).contains(&quantity), "{requested} -> {quantity}");
        }
    }

    #[test]
    fn test_update_quantity_above_stock_is_clamped_and_reported() {
        let mut cart = store();
        let id = LineItemId::new("sku-1");
        let mut limited = item("sku-1", 500);
        limited.stock = Some(50);
        cart.add_item(limited).unwrap();
        let mut events = cart.subscribe();

        let outcome = cart.update_quantity(&id, 500);

        assert_eq!(
            outcome,
            UpdateOutcome::Clamped {
                requested: 500,
                limit: 50,
                quantity: 50
            }
        );
        assert_eq!(cart.get(&id).unwrap().quantity, 50);
        assert_eq!(
            events.try_recv().unwrap(),
            CartEvent::QuantityChanged {
                id: id.clone(),
                quantity: 50
            }
        );
        let warning = events.try_recv().unwrap();
        assert_eq!(
            warning,
            CartEvent::LimitExceeded {
                id,
                requested: 500,
                limit: 50
            }
        );
        assert_eq!(
            warning.notice().as_deref(),
            Some("Only 50 available, quantity adjusted")
        );
    }

    #[test]
    fn test_update_quantity_uses_configured_default_limit() {
        let mut cart = CartStore::in_memory(CartSettings {
            default_stock_limit: 10,
            ..CartSettings::default()
        });
        let id = LineItemId::new("sku-1");
        cart.add_item(item("sku-1", 5)).unwrap();

        assert!(matches!(
            cart.update_quantity(&id, 11),
            UpdateOutcome::Clamped { limit: 10, .. }
        ));
    }

    #[test]
    fn test_update_quantity_below_one_is_not_a_warning() {
        let mut cart = store();
        let id = LineItemId::new("sku-1");
        cart.add_item(item("sku-1", 5)).unwrap();

        assert_eq!(
            cart.update_quantity(&id, -4),
            UpdateOutcome::Updated { quantity: 1 }
        );
    }

    #[test]
    fn test_update_quantity_missing_id() {
        let mut cart = store();
        assert_eq!(
            cart.update_quantity(&LineItemId::new("nope"), 3),
            UpdateOutcome::NotFound
        );
        assert!(!cart.has_pending_write());
    }

    #[test]
    fn test_clear_then_total_is_zero() {
        let mut cart = store();
        cart.add_item(item("a", 100)).unwrap();
        cart.add_item(item("b", 250)).unwrap();

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_order() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::open(Arc::new(storage.clone()), CartSettings::default());
        cart.add_item(item("c", 30)).unwrap();
        cart.add_item(item("a", 10)).unwrap();
        cart.add_item(item("b", 20)).unwrap();
        cart.update_quantity(&LineItemId::new("a"), 4);
        let original = cart.items().to_vec();
        cart.close();

        let reopened = CartStore::open(Arc::new(storage), CartSettings::default());

        assert_eq!(reopened.items(), original.as_slice());
    }

    #[test]
    fn test_invalid_snapshot_opens_empty() {
        let storage = MemoryStorage::with_value("cart", "{not json");
        let cart = CartStore::open(Arc::new(storage), CartSettings::default());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_restore_reclamps_and_dedupes() {
        let snapshot = r#"[
            {"id":"a","name":"A","price":10,"quantity":0},
            {"id":"b","name":"B","price":10,"quantity":900,"stock":5},
            {"id":"a","name":"A again","price":10,"quantity":3},
            {"id":"","name":"Blank","price":10,"quantity":1}
        ]"#;
        let storage = MemoryStorage::with_value("cart", snapshot);

        let cart = CartStore::open(Arc::new(storage), CartSettings::default());

        let quantities: Vec<_> = cart
            .items()
            .iter()
            .map(|i| (i.id.as_str(), i.quantity))
            .collect();
        assert_eq!(quantities, vec![("a", 1), ("b", 5)]);
    }

    #[test]
    fn test_events_follow_mutations() {
        let mut cart = store();
        let mut events = cart.subscribe();
        let id = LineItemId::new("sku-1");

        cart.add_item(item("sku-1", 5)).unwrap();
        cart.remove_item(&id);
        cart.clear();

        assert_eq!(events.try_recv().unwrap(), CartEvent::Added { id: id.clone() });
        assert_eq!(events.try_recv().unwrap(), CartEvent::Removed { id });
        assert_eq!(events.try_recv().unwrap(), CartEvent::Cleared);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutation_burst_persists_last_state_once() {
        let storage = MemoryStorage::new();
        let mut cart = CartStore::open(Arc::new(storage.clone()), CartSettings::default());

        cart.add_item(item("sku-1", 5)).unwrap();
        cart.add_item(item("sku-1", 5)).unwrap();
        cart.add_item(item("sku-2", 7)).unwrap();
        assert_eq!(storage.write_count(), 0);

        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(storage.write_count(), 1);
        assert_eq!(storage.get("cart").unwrap(), cart.snapshot_json().unwrap());
    }

    struct FailingStorage;

    impl CartStorage for FailingStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_storage_failure_keeps_cart_in_memory() {
        let mut cart = CartStore::open(Arc::new(FailingStorage), CartSettings::default());
        assert!(cart.is_empty());

        cart.add_item(item("sku-1", 5)).unwrap();
        cart.add_item(item("sku-1", 5)).unwrap();
        cart.flush();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Decimal::from(10));
    }
}
