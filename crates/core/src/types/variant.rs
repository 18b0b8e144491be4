//! Product variant (size and color) selected by the shopper.

use serde::{Deserialize, Serialize};

/// Sizes offered on the product pages.
pub const SIZES: &[&str] = &["S", "M", "L", "XL"];

/// Metal colors offered on the product pages.
pub const COLORS: &[&str] = &["Gold", "Silver", "Rose Gold"];

/// A size/color combination.
///
/// Stored as plain strings: the cart accepts any variant, the option lists
/// only drive what the product pages offer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    pub size: String,
    pub color: String,
}

impl Variant {
    /// Create a variant from a size and color.
    #[must_use]
    pub fn new(size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            size: size.into(),
            color: color.into(),
        }
    }

    /// The selectable sizes and colors, in display order.
    #[must_use]
    pub const fn options() -> (&'static [&'static str], &'static [&'static str]) {
        (SIZES, COLORS)
    }

    /// Whether both size and color come from the offered option lists.
    #[must_use]
    pub fn is_offered(&self) -> bool {
        SIZES.contains(&self.size.as_str()) && COLORS.contains(&self.color.as_str())
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::new("S", "Gold")
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.size, self.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_small_gold() {
        assert_eq!(Variant::default(), Variant::new("S", "Gold"));
    }

    #[test]
    fn test_is_offered() {
        assert!(Variant::new("XL", "Rose Gold").is_offered());
        assert!(!Variant::new("XXL", "Gold").is_offered());
        assert!(!Variant::new("M", "Platinum").is_offered());
    }

    #[test]
    fn test_display() {
        assert_eq!(Variant::new("M", "Silver").to_string(), "M, Silver");
    }
}
