//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. Every ID in this
//! storefront is an opaque string assigned by the browser app or by Firebase.

use crate::types::variant::Variant;

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`, `is_empty()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use miss_gypsy_core::define_id;
/// define_id!(OrderRef);
/// define_id!(ReviewRef);
///
/// let order = OrderRef::new("ord-1");
/// let review = ReviewRef::new("ord-1");
///
/// // These are different types, so this won't compile:
/// // let _: OrderRef = review;
/// assert_eq!(order.as_str(), review.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID is empty (or only whitespace).
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(LineItemId);
define_id!(UserUid);
define_id!(DocumentId);

impl LineItemId {
    /// Build the line item ID for a product in a chosen variant.
    ///
    /// The ID is `"{name}-{size}-{color}"`, lowercased with whitespace runs
    /// collapsed to `-`, so the same product in the same variant always maps
    /// to the same cart row.
    ///
    /// ```rust
    /// # use miss_gypsy_core::{LineItemId, Variant};
    /// let id = LineItemId::for_product("Moon Hoops", &Variant::new("M", "Rose Gold"));
    /// assert_eq!(id.as_str(), "moon-hoops-m-rose-gold");
    /// ```
    #[must_use]
    pub fn for_product(name: &str, variant: &Variant) -> Self {
        let raw = format!("{name} {} {}", variant.size, variant.color);
        let slug = raw
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join("-");
        Self(slug)
    }
}
