//! Miss Gypsy Core - Shared types library.
//!
//! This crate provides common types used across the Miss Gypsy storefront:
//! - `storefront` - Cart store, session holder, forms and Firebase clients
//! - `integration-tests` - Cross-module scenarios
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for line item IDs, prices, emails, variants and ratings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
