//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Email/password accounts and the signed-in session
//! - `reviews` - Submit and list customer reviews
//! - `contact` - Contact form messages
//! - `checkout` - Checkout summary from the cart and shipping details
//!
//! Services borrow the long-lived clients from [`AppState`](crate::state::AppState)
//! and are cheap to construct per request.

pub mod auth;
pub mod checkout;
pub mod contact;
pub mod reviews;

pub use auth::{AuthError, AuthOperation, AuthService};
pub use checkout::{CheckoutError, CheckoutSummary};
pub use contact::{ContactError, ContactService};
pub use reviews::{ReviewError, ReviewService};
