//! Contact form submissions stored in Firestore.

use thiserror::Error;
use tracing::instrument;

use miss_gypsy_core::DocumentId;

use crate::error::{add_breadcrumb, capture_internal};
use crate::firebase::{DocumentClient, FirebaseError};
use crate::forms::{ContactForm, FieldErrors};

/// Firestore collection holding contact messages.
pub const CONTACTS_COLLECTION: &str = "contacts";

/// Errors from sending a contact message.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    #[error("contact store error: {0}")]
    Firebase(#[from] FirebaseError),
}

impl ContactError {
    /// Message safe to show under the contact form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::Firebase(_) => "Failed to send message. Please try again.".to_string(),
        }
    }
}

/// Sends contact messages.
pub struct ContactService<'a> {
    documents: &'a DocumentClient,
}

impl<'a> ContactService<'a> {
    #[must_use]
    pub const fn new(documents: &'a DocumentClient) -> Self {
        Self { documents }
    }

    /// Validate and store a contact message.
    ///
    /// # Errors
    ///
    /// Returns `ContactError::Validation` if the form is invalid, or
    /// `ContactError::Firebase` if the write fails.
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: &ContactForm) -> Result<DocumentId, ContactError> {
        let message = form.validate()?;

        let id = self
            .documents
            .add_document(CONTACTS_COLLECTION, message.to_fields())
            .await
            .inspect_err(|e| {
                capture_internal(e, "store contact message");
            })?;

        add_breadcrumb("contact", "Message sent", None);
        Ok(id)
    }
}
