//! Unified error handling with Sentry integration.
//!
//! Provides a unified `StorefrontError` type that captures service faults to
//! Sentry and maps every failure to a message safe to show a shopper.

use thiserror::Error;

use crate::cart::{CartError, StorageError};
use crate::config::ConfigError;
use crate::firebase::FirebaseError;
use crate::forms::FieldErrors;
use crate::services::{AuthError, AuthOperation, CheckoutError, ContactError, ReviewError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Cart mutation rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Cart snapshot storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Firebase call failed.
    #[error("Firebase error: {0}")]
    Firebase(#[from] FirebaseError),

    /// Authentication failed.
    #[error("Auth error: {1}")]
    Auth(AuthOperation, #[source] AuthError),

    /// Review submission or listing failed.
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// Contact message failed.
    #[error("Contact error: {0}")]
    Contact(#[from] ContactError),

    /// Checkout could not be prepared.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Form input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] FieldErrors),
}

impl StorefrontError {
    /// Wrap an auth failure with the flow it came from.
    #[must_use]
    pub const fn auth(operation: AuthOperation, err: AuthError) -> Self {
        Self::Auth(operation, err)
    }

    /// Whether this is a fault on our side or a collaborator's, rather than
    /// bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Firebase(_) => true,
            Self::Auth(_, err) => err.is_internal(),
            Self::Review(ReviewError::Firebase(_)) | Self::Contact(ContactError::Firebase(_)) => {
                true
            }
            Self::Cart(_)
            | Self::Review(_)
            | Self::Contact(_)
            | Self::Checkout(_)
            | Self::Validation(_) => false,
        }
    }

    /// Message safe to show a shopper. Internal details are never exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) | Self::Storage(_) | Self::Firebase(_) => {
                "Something went wrong, please try again".to_string()
            }
            Self::Cart(CartError::InvalidInput(_)) => "This item could not be added".to_string(),
            Self::Auth(operation, err) => err.user_message(*operation),
            Self::Review(err) => err.user_message(),
            Self::Contact(err) => err.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::Validation(errors) => errors
                .iter()
                .next()
                .map(|(_, message)| message.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Capture a service fault to Sentry and log it with the event id.
///
/// `context` names the operation that failed. Returns the Sentry event id,
/// which is nil when Sentry is not initialized.
pub fn capture_internal<E>(err: &E, context: &str) -> sentry::types::Uuid
where
    E: std::error::Error + ?Sized,
{
    let event_id = sentry::capture_error(err);
    tracing::error!(
        error = %err,
        context,
        sentry_event_id = %event_id,
        "Internal error"
    );
    event_id
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(uid: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(uid.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Item added", Some(&[("id", "moon-hoops-m-gold")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        breadcrumb.data.extend(pairs.iter().map(|(key, value)| {
            (
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            )
        }));
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_details_hidden() {
        let err = StorefrontError::from(FirebaseError::Api {
            status: 500,
            message: "internal stack trace".to_string(),
        });
        assert!(err.is_internal());
        assert!(!err.user_message().contains("stack trace"));
    }

    #[test]
    fn test_auth_message_uses_operation() {
        let err = StorefrontError::auth(
            AuthOperation::Register,
            AuthError::Firebase(FirebaseError::Unexpected("x".to_string())),
        );
        assert_eq!(err.user_message(), "An error occurred during registration");

        let err = StorefrontError::auth(AuthOperation::Login, AuthError::WrongPassword);
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Incorrect password");
    }

    #[test]
    fn test_checkout_is_user_error() {
        let err = StorefrontError::from(CheckoutError::EmptyCart);
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Your cart is empty");
    }

    #[test]
    fn test_validation_shows_first_message() {
        let mut errors = FieldErrors::new();
        errors.add("email", "Valid email is required");
        let err = StorefrontError::from(errors);
        assert_eq!(err.user_message(), "Valid email is required");
    }

    #[test]
    fn test_capture_without_sentry_is_noop() {
        let err = FirebaseError::Unexpected("missing localId".to_string());
        assert!(capture_internal(&err, "sign in").is_nil());
    }
}
