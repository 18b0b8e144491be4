//! Customer reviews and contact messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use miss_gypsy_core::{DocumentId, Email, Rating};

use crate::firebase::documents::{Document, FieldValue, Fields};

/// Name stored when a reviewer leaves the name blank.
pub const ANONYMOUS: &str = "Anonymous";

/// A customer review shown on the home page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Option<DocumentId>,
    pub name: String,
    pub rating: Rating,
    pub comment: String,
    /// Server-assigned, `None` until stored.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Review {
    /// Firestore fields for a new review. `timestamp` is set by the server.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), FieldValue::string(&self.name));
        fields.insert(
            "rating".to_string(),
            FieldValue::integer(i64::from(self.rating.stars())),
        );
        fields.insert("comment".to_string(), FieldValue::string(&self.comment));
        fields
    }

    /// Rebuild a review from a stored document. Documents with a missing or
    /// out-of-range rating are skipped.
    #[must_use]
    pub fn from_document(doc: &Document) -> Option<Self> {
        let rating = Rating::new(doc.integer_field("rating")?).ok()?;
        Some(Self {
            id: Some(doc.id()),
            name: doc.string_field("name").unwrap_or(ANONYMOUS).to_string(),
            rating,
            comment: doc.string_field("comment").unwrap_or_default().to_string(),
            timestamp: doc.timestamp(),
        })
    }
}

/// A message sent through the contact page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: Email,
    pub message: String,
}

impl ContactMessage {
    /// Firestore fields for the message. `timestamp` is set by the server.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), FieldValue::string(&self.name));
        fields.insert("email".to_string(), FieldValue::string(self.email.as_str()));
        fields.insert("message".to_string(), FieldValue::string(&self.message));
        fields
    }
}
