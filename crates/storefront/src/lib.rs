//! Miss Gypsy storefront library.
//!
//! Cart store with debounced persistence, the signed-in session, form
//! validation, and typed Firebase clients for the catalog, reviews, contact
//! messages and accounts.
//!
//! # Example
//!
//! ```rust,ignore
//! use miss_gypsy_storefront::{config::StorefrontConfig, state::AppState, telemetry};
//!
//! let config = StorefrontConfig::from_env()?;
//! let _sentry_guard = telemetry::init(&config);
//!
//! let state = AppState::new(config);
//! let mut cart = state.open_cart();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod config;
pub mod error;
pub mod firebase;
pub mod forms;
pub mod models;
pub mod services;
pub mod state;
pub mod telemetry;

pub use error::{Result, StorefrontError};
