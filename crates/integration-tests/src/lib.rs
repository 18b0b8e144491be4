//! Integration tests for the Miss Gypsy storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p miss-gypsy-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - File-backed cart snapshots across store instances
//! - `checkout` - Checkout summaries built from a populated cart
//! - `firebase` - Catalog, document and identity clients against local
//!   `axum` servers standing in for Firebase
//!
//! No network access is needed; Firebase endpoints are served on loopback.
