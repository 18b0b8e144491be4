//! Domain models for the storefront.

pub mod product;
pub mod review;
pub mod session;

pub use product::Product;
pub use review::{ContactMessage, Review};
pub use session::{CurrentUser, SessionHolder};
