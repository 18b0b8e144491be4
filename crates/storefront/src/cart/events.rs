//! Change notifications broadcast by the cart store.

use miss_gypsy_core::LineItemId;

/// Something changed in the cart.
///
/// Subscribers (header badge, cart page, toasts) receive one event per
/// mutation; a clamped update also produces [`CartEvent::LimitExceeded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// A new line item was appended with quantity 1.
    Added { id: LineItemId },
    /// An existing line item's quantity was set.
    QuantityChanged { id: LineItemId, quantity: u32 },
    /// A quantity request above the stock limit was capped.
    LimitExceeded {
        id: LineItemId,
        requested: i64,
        limit: u32,
    },
    /// A line item was removed.
    Removed { id: LineItemId },
    /// The cart was emptied.
    Cleared,
}

impl CartEvent {
    /// Line item the event refers to, if any.
    #[must_use]
    pub const fn id(&self) -> Option<&LineItemId> {
        match self {
            Self::Added { id }
            | Self::QuantityChanged { id, .. }
            | Self::LimitExceeded { id, .. }
            | Self::Removed { id } => Some(id),
            Self::Cleared => None,
        }
    }

    /// Message to surface to the shopper, for events that warrant one.
    #[must_use]
    pub fn notice(&self) -> Option<String> {
        match self {
            Self::LimitExceeded { limit, .. } => {
                Some(format!("Only {limit} available, quantity adjusted"))
            }
            _ => None,
        }
    }
}
