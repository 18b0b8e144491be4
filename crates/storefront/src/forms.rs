//! Form validation for checkout, contact, review, login and register.
//!
//! Each form validates into a typed value or a [`FieldErrors`] map keyed by
//! field name, with the messages the pages display next to each input.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use miss_gypsy_core::{Email, Rating};

use crate::models::{ContactMessage, Review};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum contact message length, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 1000;

/// Maximum review comment length, in characters.
pub const MAX_COMMENT_LENGTH: usize = 500;

/// Key used for errors that are not tied to one input.
pub const FORM_FIELD: &str = "form";

static CHECKOUT_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w\-.]+@([\w-]+\.)+[\w-]{2,4}$").expect("Invalid regex"));

static CONTACT_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"));

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("Invalid regex"));

/// Validation failures, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("invalid form: {}", self.summary())]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field`, keeping the first one per field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Whether no field failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Failed fields and their messages, ordered by field name.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn summary(&self) -> String {
        self.iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

// =============================================================================
// Checkout
// =============================================================================

/// Raw checkout form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// Validated shipping details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDetails {
    pub name: String,
    pub email: Email,
    pub address: String,
}

impl CheckoutForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` for each invalid field.
    pub fn validate(&self) -> Result<CheckoutDetails, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let email = Some(self.email.trim())
            .filter(|e| CHECKOUT_EMAIL.is_match(e))
            .and_then(|e| Email::parse(e).ok());
        if email.is_none() {
            errors.add("email", "Valid email is required");
        }

        let address = self.address.trim();
        if address.is_empty() {
            errors.add("address", "Address is required");
        }

        match email {
            Some(email) if errors.is_empty() => Ok(CheckoutDetails {
                name: name.to_string(),
                email,
                address: address.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Contact
// =============================================================================

/// Raw contact form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    /// Validate the form into a trimmed message.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` for each invalid field.
    pub fn validate(&self) -> Result<ContactMessage, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }

        let email = self.email.trim();
        let parsed = if email.is_empty() {
            errors.add("email", "Email is required");
            None
        } else if !CONTACT_EMAIL.is_match(email) {
            errors.add("email", "Invalid email format");
            None
        } else {
            Email::parse(email)
                .map_err(|_| errors.add("email", "Invalid email format"))
                .ok()
        };

        let message = self.message.trim();
        if message.is_empty() {
            errors.add("message", "Message is required");
        } else if message.chars().count() > MAX_MESSAGE_LENGTH {
            errors.add("message", "Message must be under 1000 characters");
        }

        match parsed {
            Some(email) if errors.is_empty() => Ok(ContactMessage {
                name: name.to_string(),
                email,
                message: message.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Review
// =============================================================================

/// Raw review form input. `rating` is 0 until a star is picked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    pub name: String,
    pub rating: i64,
    pub comment: String,
}

impl ReviewForm {
    /// Validate the form into an unsaved review.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` for each invalid field.
    pub fn validate(&self) -> Result<Review, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Name is required (or use 'Anonymous')");
        }

        let rating = Rating::new(self.rating)
            .map_err(|_| errors.add("rating", "Please select a rating (1-5 stars)"))
            .ok();

        let comment = self.comment.trim();
        if comment.is_empty() {
            errors.add("comment", "Comment is required");
        } else if comment.chars().count() > MAX_COMMENT_LENGTH {
            errors.add("comment", "Comment must be under 500 characters");
        }

        match rating {
            Some(rating) if errors.is_empty() => Ok(Review {
                id: None,
                name: name.to_string(),
                rating,
                comment: comment.to_string(),
                timestamp: None,
            }),
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Login / Register
// =============================================================================

/// Validated email/password pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: Email,
    pub password: SecretString,
}

/// Raw login form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    /// Validate the form.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` with a single form-level error when either field
    /// is blank, or an email error when the address is malformed.
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.email.trim().is_empty() || self.password.is_empty() {
            errors.add(FORM_FIELD, "All fields are required");
            return Err(errors);
        }

        let email = Email::parse(&self.email)
            .map_err(|_| errors.add("email", "Please enter a valid email address"))
            .ok();

        match email {
            Some(email) => Ok(Credentials {
                email,
                password: SecretString::from(self.password.clone()),
            }),
            None => Err(errors),
        }
    }
}

/// Raw registration form input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegisterForm {
    /// Trim every field and strip `<script>` blocks.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            email: sanitize(&self.email),
            password: sanitize(&self.password),
            confirm_password: sanitize(&self.confirm_password),
        }
    }

    /// Sanitize and validate the form.
    ///
    /// # Errors
    ///
    /// Returns `FieldErrors` for each invalid field.
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let form = self.sanitized();
        let mut errors = FieldErrors::new();

        let email = if form.email.is_empty() {
            errors.add("email", "Email is required");
            None
        } else if CONTACT_EMAIL.is_match(&form.email) {
            Email::parse(&form.email)
                .map_err(|_| errors.add("email", "Please enter a valid email address"))
                .ok()
        } else {
            errors.add("email", "Please enter a valid email address");
            None
        };

        if form.password.is_empty() {
            errors.add("password", "Password is required");
        } else if form.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add("password", "Password must be at least 6 characters");
        }

        if form.confirm_password.is_empty() {
            errors.add("confirm_password", "Confirm Password is required");
        } else if form.password != form.confirm_password {
            errors.add("confirm_password", "Passwords do not match");
        }

        match email {
            Some(email) => errors.into_result(|| Credentials {
                email,
                password: SecretString::from(form.password),
            }),
            None => Err(errors),
        }
    }
}

fn sanitize(value: &str) -> String {
    SCRIPT_BLOCK.replace_all(value.trim(), "").into_owned()
}
